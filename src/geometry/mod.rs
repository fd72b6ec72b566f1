mod bbox;
mod types;

pub use bbox::{BoundingBox, BoundingBoxBuilder};
pub use types::{clamp_coord, Axis, Heading, Point};
