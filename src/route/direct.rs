use super::{ObstacleLayout, ResolvedEndpoint};
use crate::constants::INTERIOR_EPSILON;
use crate::geometry::{Axis, Heading, Point};

/// Straight two-point route between aligned endpoints, if one is allowed.
///
/// Each bound endpoint must face the direction of travel, and the straight
/// run between the grid entry points must stay clear of both obstacles.
pub fn direct_route(
    start: &ResolvedEndpoint,
    end: &ResolvedEndpoint,
    layout: &ObstacleLayout,
    tolerance: f64,
) -> Option<Vec<Point>> {
    let (s, e) = (start.point, end.point);
    let axis = if (e.y - s.y).abs() <= tolerance {
        Axis::Horizontal
    } else if (e.x - s.x).abs() <= tolerance {
        Axis::Vertical
    } else {
        return None;
    };
    if start.heading.axis() != axis || end.heading.axis() != axis {
        return None;
    }
    let travel = match axis {
        Axis::Horizontal if e.x >= s.x => Heading::Right,
        Axis::Horizontal => Heading::Left,
        Axis::Vertical if e.y >= s.y => Heading::Down,
        Axis::Vertical => Heading::Up,
    };
    if start.is_bound && start.heading != travel {
        return None;
    }
    if end.is_bound && end.heading != travel.opposite() {
        return None;
    }
    // an unbound endpoint only rules out running straight back on itself
    if !start.is_bound && start.heading == travel.opposite() {
        return None;
    }
    if !end.is_bound && end.heading == travel {
        return None;
    }
    let blocked = [layout.start_obstacle, layout.end_obstacle]
        .iter()
        .any(|obs| {
            obs.shrunk(INTERIOR_EPSILON)
                .segment_intersects_interior(layout.start_entry, layout.end_entry)
        });
    if blocked {
        None
    } else {
        Some(vec![s, e])
    }
}
