use serde_derive::{Deserialize, Serialize};

/// A position in user coordinates; `y` increases downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Equal within `tol` on both axes
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }

    pub fn manhattan(&self, other: &Self) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Move `dist` units in the given heading
    pub fn offset(&self, heading: Heading, dist: f64) -> Self {
        let (dx, dy) = heading.unit();
        Self::new(self.x + dx * dist, self.y + dy * dist)
    }

    /// Coordinate along the given axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Copy of this point with the coordinate along `axis` replaced
    pub fn with_along(&self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::Horizontal => Self::new(value, self.y),
            Axis::Vertical => Self::new(self.x, value),
        }
    }

    /// Scale this point away from `origin` by `factor`
    pub fn scale_from(&self, origin: Self, factor: f64) -> Self {
        Self::new(
            origin.x + (self.x - origin.x) * factor,
            origin.y + (self.y - origin.y) * factor,
        )
    }

    pub fn clamped(&self, bound: f64) -> Self {
        Self::new(clamp_coord(self.x, bound), clamp_coord(self.y, bound))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Clamp a coordinate to `-bound..=bound`, mapping NaN to zero.
pub fn clamp_coord(value: f64, bound: f64) -> f64 {
    if value.is_nan() {
        0.
    } else {
        value.clamp(-bound, bound)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(&self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The axis the segment `a`-`b` lies on, if it is axis-aligned within `tol`.
    ///
    /// Segments which are degenerate on both axes are reported as horizontal.
    pub fn of_segment(a: Point, b: Point, tol: f64) -> Option<Self> {
        let dx = (b.x - a.x).abs();
        let dy = (b.y - a.y).abs();
        if dy <= tol && dx >= dy {
            Some(Self::Horizontal)
        } else if dx <= tol {
            Some(Self::Vertical)
        } else {
            None
        }
    }
}

/// Cardinal direction of travel, or of the side a connector leaves a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn axis(&self) -> Axis {
        if self.is_horizontal() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Unit vector in screen coordinates
    pub fn unit(&self) -> (f64, f64) {
        match self {
            Self::Up => (0., -1.),
            Self::Right => (1., 0.),
            Self::Down => (0., 1.),
            Self::Left => (-1., 0.),
        }
    }

    /// +1 if travelling this way increases the coordinate along its axis
    pub fn sign(&self) -> f64 {
        match self {
            Self::Right | Self::Down => 1.,
            Self::Left | Self::Up => -1.,
        }
    }

    /// Dominant-axis heading of a vector; ties favour horizontal, and a
    /// zero vector is `Right`.
    pub fn from_vector(dx: f64, dy: f64) -> Self {
        if dx.abs() >= dy.abs() {
            if dx >= 0. {
                Self::Right
            } else {
                Self::Left
            }
        } else if dy >= 0. {
            Self::Down
        } else {
            Self::Up
        }
    }

    /// Heading of travel from `a` to `b`, by dominant axis
    pub fn between(a: Point, b: Point) -> Self {
        Self::from_vector(b.x - a.x, b.y - a.y)
    }
}
