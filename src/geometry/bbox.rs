use super::types::{clamp_coord, Heading, Point};

/// `BoundingBox` defines an axis-aligned rectangular region in user coordinates.
///
/// `(x1, y1)` is the minimum corner and `(x2, y2)` the maximum; degenerate
/// (zero-area) boxes are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BoundingBoxBuilder {
    bbox: Option<BoundingBox>,
}

impl BoundingBoxBuilder {
    pub fn new() -> Self {
        Self { bbox: None }
    }

    pub fn extend(&mut self, bbox: BoundingBox) -> &Self {
        if let Some(ref mut b) = self.bbox {
            *b = b.combine(&bbox);
        } else {
            self.bbox = Some(bbox);
        }
        self
    }

    pub fn build(self) -> Option<BoundingBox> {
        self.bbox
    }
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Square box of half-size `radius` centered on `p`
    pub fn around(p: Point, radius: f64) -> Self {
        Self::new(p.x - radius, p.y - radius, p.x + radius, p.y + radius)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x1 + (self.x2 - self.x1) / 2.,
            self.y1 + (self.y2 - self.y1) / 2.,
        )
    }

    /// Corners in clockwise order from top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }

    pub fn union(bb_iter: impl IntoIterator<Item = Self>) -> Option<Self> {
        let bb_iter = bb_iter.into_iter();
        bb_iter.reduce(|bb1, bb2| bb1.combine(&bb2))
    }

    pub fn combine(&self, other: &Self) -> Self {
        Self::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let result = Self::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        if result.width() >= 0. && result.height() >= 0. {
            Some(result)
        } else {
            None
        }
    }

    /// True if the boxes share a region of strictly positive area
    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersect(other)
            .is_some_and(|bb| bb.width() > 0. && bb.height() > 0.)
    }

    /// dilate the bounding box by the given absolute amount in each direction
    pub fn expand(&mut self, exp_x: f64, exp_y: f64) -> &Self {
        *self = Self {
            x1: self.x1 - exp_x,
            y1: self.y1 - exp_y,
            x2: self.x2 + exp_x,
            y2: self.y2 + exp_y,
        };
        self
    }

    /// dilate each side by its own amount (CSS top / right / bottom / left order)
    pub fn expand_trbl(&mut self, top: f64, right: f64, bottom: f64, left: f64) -> &Self {
        *self = Self {
            x1: self.x1 - left,
            y1: self.y1 - top,
            x2: self.x2 + right,
            y2: self.y2 + bottom,
        };
        self
    }

    /// Copy of this box shrunk by `amount` on every side; never inverts.
    pub fn shrunk(&self, amount: f64) -> Self {
        let c = self.center();
        Self::new(
            (self.x1 + amount).min(c.x),
            (self.y1 + amount).min(c.y),
            (self.x2 - amount).max(c.x),
            (self.y2 - amount).max(c.y),
        )
    }

    pub fn clamped(&self, bound: f64) -> Self {
        Self::new(
            clamp_coord(self.x1, bound),
            clamp_coord(self.y1, bound),
            clamp_coord(self.x2, bound),
            clamp_coord(self.y2, bound),
        )
    }

    /// True if `p` lies strictly inside the box
    pub fn contains_interior(&self, p: Point) -> bool {
        p.x > self.x1 && p.x < self.x2 && p.y > self.y1 && p.y < self.y2
    }

    /// The point where a ray from `p` in direction `heading` meets the
    /// corresponding side of this box (only the coordinate along the heading
    /// changes).
    pub fn edge_point(&self, heading: Heading, p: Point) -> Point {
        match heading {
            Heading::Up => Point::new(p.x, self.y1),
            Heading::Right => Point::new(self.x2, p.y),
            Heading::Down => Point::new(p.x, self.y2),
            Heading::Left => Point::new(self.x1, p.y),
        }
    }

    /// Which side of this box `p` belongs to.
    ///
    /// The box is split into four triangles from its center to its corners,
    /// with the corners scaled by `cone_scale` about the center. Points
    /// outside every triangle (or on a degenerate box) use the dominant axis
    /// of the offset from the center, normalized by the box half-sizes.
    pub fn side_heading(&self, p: Point, cone_scale: f64) -> Heading {
        let c = self.center();
        if self.width() > 0. && self.height() > 0. && !p.approx_eq(&c, f64::EPSILON) {
            let [tl, tr, br, bl] = self.corners().map(|corner| corner.scale_from(c, cone_scale));
            for (heading, a, b) in [
                (Heading::Up, tl, tr),
                (Heading::Right, tr, br),
                (Heading::Down, br, bl),
                (Heading::Left, bl, tl),
            ] {
                if in_triangle(p, c, a, b) {
                    return heading;
                }
            }
        }
        let half_w = if self.width() > 0. { self.width() / 2. } else { 1. };
        let half_h = if self.height() > 0. { self.height() / 2. } else { 1. };
        Heading::from_vector((p.x - c.x) / half_w, (p.y - c.y) / half_h)
    }

    /// Check whether the segment `a`-`b` passes through the open interior
    /// of this box. Touching or running along the boundary is not an
    /// intersection.
    ///
    /// Liang-Barsky clipping against the open box.
    pub fn segment_intersects_interior(&self, a: Point, b: Point) -> bool {
        if self.width() <= 0. || self.height() <= 0. {
            return false;
        }
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0: f64 = 0.;
        let mut t1: f64 = 1.;
        for (p, q) in [
            (-dx, a.x - self.x1),
            (dx, self.x2 - a.x),
            (-dy, a.y - self.y1),
            (dy, self.y2 - a.y),
        ] {
            if p == 0. {
                // parallel to this pair of sides; must be strictly between them
                if q <= 0. {
                    return false;
                }
            } else {
                let r = q / p;
                if p < 0. {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
                if t0 >= t1 {
                    return false;
                }
            }
        }
        t0 < t1
    }
}

fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |u: Point, v: Point| (v.x - u.x) * (p.y - u.y) - (v.y - u.y) * (p.x - u.x);
    let d1 = cross(a, b);
    let d2 = cross(b, c);
    let d3 = cross(c, a);
    let has_neg = d1 < 0. || d2 < 0. || d3 < 0.;
    let has_pos = d1 > 0. || d2 > 0. || d3 > 0.;
    !(has_neg && has_pos)
}
