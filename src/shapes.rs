//! Shapes which connector endpoints may be bound to, and the collaborators
//! used to turn a binding into concrete points.

use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};

use crate::constants::HEADING_CONE_SCALE;
use crate::geometry::{BoundingBox, Point};
use crate::RouterConfig;

/// A rectangular shape, optionally rotated about its center.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub id: String,
    /// Unrotated rectangle in world coordinates
    pub bounds: BoundingBox,
    /// Clockwise rotation in radians about the center of `bounds`
    pub rotation: f64,
}

impl Shape {
    pub fn new(id: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            id: id.into(),
            bounds,
            rotation: 0.,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    fn rotate(&self, p: Point, angle: f64) -> Point {
        if angle == 0. {
            return p;
        }
        let c = self.bounds.center();
        let (sin, cos) = angle.sin_cos();
        let (dx, dy) = (p.x - c.x, p.y - c.y);
        Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
    }

    /// Map a point in the shape's unrotated frame into world coordinates
    pub fn to_world(&self, p: Point) -> Point {
        self.rotate(p, self.rotation)
    }

    /// Map a world point into the shape's unrotated frame
    pub fn to_local(&self, p: Point) -> Point {
        self.rotate(p, -self.rotation)
    }

    /// Axis-aligned bounds of the (possibly rotated) shape
    pub fn world_bounds(&self) -> BoundingBox {
        if self.rotation == 0. {
            return self.bounds;
        }
        BoundingBox::union(
            self.bounds
                .corners()
                .map(|c| BoundingBox::around(self.to_world(c), 0.)),
        )
        .unwrap_or(self.bounds)
    }
}

/// Lookup of shapes by id.
pub trait ShapeLookup {
    fn shape(&self, id: &str) -> Option<&Shape>;
}

impl ShapeLookup for HashMap<String, Shape> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.get(id)
    }
}

impl ShapeLookup for [Shape] {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.iter().find(|s| s.id == id)
    }
}

impl ShapeLookup for Vec<Shape> {
    fn shape(&self, id: &str) -> Option<&Shape> {
        self.as_slice().shape(id)
    }
}

/// Association of a connector endpoint with a shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub shape_id: String,
    /// Normalized position within the unrotated shape, (0,0) top-left to
    /// (1,1) bottom-right. `None` binds to the shape as a whole.
    #[serde(default)]
    pub fixed_point: Option<Point>,
}

impl Binding {
    pub fn new(shape_id: impl Into<String>) -> Self {
        Self {
            shape_id: shape_id.into(),
            fixed_point: None,
        }
    }

    pub fn at(shape_id: impl Into<String>, fx: f64, fy: f64) -> Self {
        Self {
            shape_id: shape_id.into(),
            fixed_point: Some(Point::new(fx, fy)),
        }
    }
}

/// Turns a binding into concrete world positions.
pub trait BindingResolver {
    /// Where the connector path starts or ends for this binding, just
    /// outside the shape.
    fn boundary_point(&self, binding: &Binding, shape: &Shape, has_arrowhead: bool) -> Point;

    /// The point inside the shape the binding refers to, if any.
    fn anchor_point(&self, binding: &Binding, shape: &Shape) -> Option<Point>;
}

/// Default binder: snaps the fixed point to the nearest side of the shape and
/// leaves a small gap, larger when an arrowhead needs room.
#[derive(Clone, Debug)]
pub struct FixedPointBinder {
    pub gap: f64,
    pub arrowhead_gap: f64,
}

impl Default for FixedPointBinder {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl FixedPointBinder {
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            gap: config.binding_gap,
            arrowhead_gap: config.arrowhead_binding_gap,
        }
    }

    fn local_anchor(binding: &Binding, shape: &Shape) -> Point {
        let bb = &shape.bounds;
        match binding.fixed_point {
            Some(fp) => Point::new(
                bb.x1 + fp.x.clamp(0., 1.) * bb.width(),
                bb.y1 + fp.y.clamp(0., 1.) * bb.height(),
            ),
            None => bb.center(),
        }
    }
}

impl BindingResolver for FixedPointBinder {
    fn boundary_point(&self, binding: &Binding, shape: &Shape, has_arrowhead: bool) -> Point {
        let gap = if has_arrowhead {
            self.arrowhead_gap
        } else {
            self.gap
        };
        let local = Self::local_anchor(binding, shape);
        let side = shape.bounds.side_heading(local, HEADING_CONE_SCALE);
        let mut outer = shape.bounds;
        outer.expand(gap, gap);
        shape.to_world(outer.edge_point(side, local))
    }

    fn anchor_point(&self, binding: &Binding, shape: &Shape) -> Option<Point> {
        binding
            .fixed_point
            .map(|_| shape.to_world(Self::local_anchor(binding, shape)))
    }
}
