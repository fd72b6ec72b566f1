use super::ResolvedEndpoint;
use crate::geometry::Point;

/// Last-resort S-shaped connector; performs no obstacle checks.
///
/// Short connectors share a midpoint on y. Otherwise the middle segment runs
/// perpendicular to the start heading.
pub fn fallback_path(
    start: &ResolvedEndpoint,
    end: &ResolvedEndpoint,
    min_arrow_length: f64,
) -> Vec<Point> {
    let (s, e) = (start.point, end.point);
    let mid = Point::new((s.x + e.x) / 2., (s.y + e.y) / 2.);
    if s.manhattan(&e) < min_arrow_length || !start.heading.is_horizontal() {
        vec![s, Point::new(s.x, mid.y), Point::new(e.x, mid.y), e]
    } else {
        vec![s, Point::new(mid.x, s.y), Point::new(mid.x, e.y), e]
    }
}
