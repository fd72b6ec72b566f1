//! Constants used throughout elbowdx

/// Points closer than this on both axes are treated as the same point, and
/// segments whose cross-axis delta is within it count as axis-aligned.
pub const DEDUP_THRESHOLD: f64 = 1.0;
/// All routed coordinates are clamped to `-POSITION_BOUND..=POSITION_BOUND`
pub const POSITION_BOUND: f64 = 1_000_000.0;

/// Obstacle clearance on the exit side of a bound shape, also used as the
/// margin around the routing area
pub const BASE_PADDING: f64 = 40.0;
/// Obstacle clearance on the three non-exit sides of a bound shape
pub const SIDE_PADDING: f64 = 20.0;
/// Half-size of the obstacle box used for unbound endpoints, and for both
/// endpoints when their shapes' padded boxes overlap
pub const POINT_BOX_RADIUS: f64 = 2.0;
/// Obstacles are shrunk by this before interior tests, so travelling along
/// an obstacle edge is allowed
pub const INTERIOR_EPSILON: f64 = 0.01;

/// Below this Manhattan length the fallback is a shared-midpoint S-shape
pub const MIN_ARROW_LENGTH: f64 = 20.0;

/// Gap between a shape edge and a bound endpoint without an arrowhead
pub const BINDING_GAP: f64 = 5.0;
/// Gap between a shape edge and a bound endpoint carrying an arrowhead
pub const ARROWHEAD_BINDING_GAP: f64 = 10.0;
/// Scale applied to a shape's corners (about its center) when deciding which
/// side a point belongs to
pub const HEADING_CONE_SCALE: f64 = 2.0;

/// Minimum stub length the editor inserts next to an endpoint
pub const FIXED_SEGMENT_PADDING: f64 = 20.0;

/// Version of the JSON request / response documents
pub const JSON_API_VERSION: u32 = 1;
