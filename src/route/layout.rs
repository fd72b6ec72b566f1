use tracing::debug;

use super::ResolvedEndpoint;
use crate::geometry::{BoundingBox, Heading, Point};
use crate::RouterConfig;

/// Obstacles and grid entry points for a single routing call.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleLayout {
    /// Area the grid search may use
    pub common_bounds: BoundingBox,
    pub start_entry: Point,
    pub end_entry: Point,
    pub start_obstacle: BoundingBox,
    pub end_obstacle: BoundingBox,
}

fn raw_box(ep: &ResolvedEndpoint, radius: f64) -> BoundingBox {
    ep.bounds
        .unwrap_or_else(|| BoundingBox::around(ep.point, radius))
}

/// Padded obstacle for an endpoint; only bound endpoints are inflated.
fn inflate(ep: &ResolvedEndpoint, raw: BoundingBox, config: &RouterConfig) -> BoundingBox {
    let mut obstacle = raw;
    if ep.is_bound {
        let pad = |h: Heading| {
            if h == ep.heading {
                config.base_padding
            } else {
                config.side_padding
            }
        };
        obstacle.expand_trbl(
            pad(Heading::Up),
            pad(Heading::Right),
            pad(Heading::Down),
            pad(Heading::Left),
        );
    }
    obstacle
}

/// Gap between two boxes along x and y; negative when they overlap on that axis.
fn separation(a: &BoundingBox, b: &BoundingBox) -> (f64, f64) {
    (
        (b.x1 - a.x2).max(a.x1 - b.x2),
        (b.y1 - a.y2).max(a.y1 - b.y2),
    )
}

/// Pull the facing sides of two obstacles back to at most the midpoint of the
/// gap between their raw boxes, along the axis of greatest separation.
fn pull_to_midpoint(
    s_obs: &mut BoundingBox,
    e_obs: &mut BoundingBox,
    s_raw: &BoundingBox,
    e_raw: &BoundingBox,
) {
    let (sep_x, sep_y) = separation(s_raw, e_raw);
    if sep_x.max(sep_y) <= 0. {
        return;
    }
    if sep_x >= sep_y {
        if s_raw.x2 <= e_raw.x1 {
            let mid = (s_raw.x2 + e_raw.x1) / 2.;
            s_obs.x2 = s_obs.x2.min(mid);
            e_obs.x1 = e_obs.x1.max(mid);
        } else {
            let mid = (e_raw.x2 + s_raw.x1) / 2.;
            e_obs.x2 = e_obs.x2.min(mid);
            s_obs.x1 = s_obs.x1.max(mid);
        }
    } else if s_raw.y2 <= e_raw.y1 {
        let mid = (s_raw.y2 + e_raw.y1) / 2.;
        s_obs.y2 = s_obs.y2.min(mid);
        e_obs.y1 = e_obs.y1.max(mid);
    } else {
        let mid = (e_raw.y2 + s_raw.y1) / 2.;
        e_obs.y2 = e_obs.y2.min(mid);
        s_obs.y1 = s_obs.y1.max(mid);
    }
}

/// Split overlapping obstacles along the dominant axis between the raw
/// boxes. Neither obstacle is cut past its own raw center.
fn split_overlap(
    s_obs: &mut BoundingBox,
    e_obs: &mut BoundingBox,
    s_raw: &BoundingBox,
    e_raw: &BoundingBox,
) {
    let sc = s_raw.center();
    let ec = e_raw.center();
    let (sep_x, sep_y) = separation(s_raw, e_raw);
    if (ec.x - sc.x).abs() >= (ec.y - sc.y).abs() {
        let start_first = sc.x <= ec.x;
        let mid = match (sep_x > 0., start_first) {
            (true, true) => (s_raw.x2 + e_raw.x1) / 2.,
            (true, false) => (e_raw.x2 + s_raw.x1) / 2.,
            (false, _) => (sc.x + ec.x) / 2.,
        };
        if start_first {
            s_obs.x2 = s_obs.x2.min(mid.max(sc.x));
            e_obs.x1 = e_obs.x1.max(mid.min(ec.x));
        } else {
            e_obs.x2 = e_obs.x2.min(mid.max(ec.x));
            s_obs.x1 = s_obs.x1.max(mid.min(sc.x));
        }
    } else {
        let start_first = sc.y <= ec.y;
        let mid = match (sep_y > 0., start_first) {
            (true, true) => (s_raw.y2 + e_raw.y1) / 2.,
            (true, false) => (e_raw.y2 + s_raw.y1) / 2.,
            (false, _) => (sc.y + ec.y) / 2.,
        };
        if start_first {
            s_obs.y2 = s_obs.y2.min(mid.max(sc.y));
            e_obs.y1 = e_obs.y1.max(mid.min(ec.y));
        } else {
            e_obs.y2 = e_obs.y2.min(mid.max(ec.y));
            s_obs.y1 = s_obs.y1.max(mid.min(sc.y));
        }
    }
}

/// Restore the exit side of a bound endpoint's obstacle if pulling or
/// splitting cut it back past the endpoint itself.
fn keep_exit_side(obstacle: &mut BoundingBox, ep: &ResolvedEndpoint) {
    if !ep.is_bound {
        return;
    }
    let p = ep.point;
    match ep.heading {
        Heading::Up => obstacle.y1 = obstacle.y1.min(p.y),
        Heading::Right => obstacle.x2 = obstacle.x2.max(p.x),
        Heading::Down => obstacle.y2 = obstacle.y2.max(p.y),
        Heading::Left => obstacle.x1 = obstacle.x1.min(p.x),
    }
}

/// Build the obstacle layout for a pair of resolved endpoints.
pub fn plan_layout(
    start: &ResolvedEndpoint,
    end: &ResolvedEndpoint,
    config: &RouterConfig,
) -> ObstacleLayout {
    let mut s_raw = raw_box(start, config.point_box_radius);
    let mut e_raw = raw_box(end, config.point_box_radius);
    let mut s_obs = inflate(start, s_raw, config);
    let mut e_obs = inflate(end, e_raw, config);

    if start.is_bound && end.is_bound && s_obs.overlaps(&e_obs) {
        debug!("padded shapes overlap; using point obstacles");
        s_raw = BoundingBox::around(start.point, config.point_box_radius);
        e_raw = BoundingBox::around(end.point, config.point_box_radius);
        s_obs = s_raw;
        e_obs = e_raw;
    }

    pull_to_midpoint(&mut s_obs, &mut e_obs, &s_raw, &e_raw);

    if s_obs.overlaps(&e_obs) {
        split_overlap(&mut s_obs, &mut e_obs, &s_raw, &e_raw);
    }
    keep_exit_side(&mut s_obs, start);
    keep_exit_side(&mut e_obs, end);

    let s_obs = s_obs.clamped(config.position_bound);
    let e_obs = e_obs.clamped(config.position_bound);

    let mut common_bounds = s_obs.combine(&e_obs);
    common_bounds.expand(config.base_padding, config.base_padding);

    ObstacleLayout {
        common_bounds: common_bounds.clamped(config.position_bound),
        start_entry: s_obs.edge_point(start.heading, start.point),
        end_entry: e_obs.edge_point(end.heading, end.point),
        start_obstacle: s_obs,
        end_obstacle: e_obs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(point: Point, bounds: BoundingBox, heading: Heading) -> ResolvedEndpoint {
        ResolvedEndpoint {
            bounds: Some(bounds),
            is_bound: true,
            ..ResolvedEndpoint::unbound(point, heading)
        }
    }

    #[test]
    fn test_inflate_and_pull() {
        let cfg = RouterConfig::default();
        let start = bound(
            Point::new(105., 25.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Right,
        );
        let end = bound(
            Point::new(295., 225.),
            BoundingBox::new(300., 200., 400., 250.),
            Heading::Left,
        );
        let layout = plan_layout(&start, &end, &cfg);
        // x separation (200) beats y separation (150); midpoint is x=200,
        // well beyond the 40 unit padding so nothing is pulled in
        assert_eq!(layout.start_obstacle, BoundingBox::new(-20., -20., 140., 70.));
        assert_eq!(layout.end_obstacle, BoundingBox::new(260., 180., 420., 270.));
        assert_eq!(layout.start_entry, Point::new(140., 25.));
        assert_eq!(layout.end_entry, Point::new(260., 225.));
        assert_eq!(layout.common_bounds, BoundingBox::new(-60., -60., 460., 310.));
    }

    #[test]
    fn test_pull_close_shapes() {
        let cfg = RouterConfig::default();
        let start = bound(
            Point::new(50., 55.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Down,
        );
        let end = bound(
            Point::new(105., 135.),
            BoundingBox::new(0., 110., 100., 160.),
            Heading::Right,
        );
        let layout = plan_layout(&start, &end, &cfg);
        // the 40 unit exit padding is pulled back to the midpoint of the gap
        assert_eq!(layout.start_obstacle.y2, 80.);
        assert_eq!(layout.end_obstacle.y1, 90.);
        assert_eq!(layout.start_entry, Point::new(50., 80.));
        assert!(!layout.start_obstacle.overlaps(&layout.end_obstacle));
    }

    #[test]
    fn test_overlap_collapses_to_points() {
        let cfg = RouterConfig::default();
        let start = bound(
            Point::new(105., 25.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Right,
        );
        let end = bound(
            Point::new(115., 25.),
            BoundingBox::new(120., 0., 220., 50.),
            Heading::Left,
        );
        let layout = plan_layout(&start, &end, &cfg);
        assert_eq!(layout.start_obstacle, BoundingBox::new(103., 23., 107., 27.));
        assert_eq!(layout.end_obstacle, BoundingBox::new(113., 23., 117., 27.));
        assert_eq!(layout.start_entry, Point::new(107., 25.));
        assert_eq!(layout.end_entry, Point::new(113., 25.));
    }

    #[test]
    fn test_split_overlapping_point_and_shape() {
        let cfg = RouterConfig::default();
        let start = bound(
            Point::new(105., 25.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Right,
        );
        // unbound end beside the start shape, within its padding
        let end = ResolvedEndpoint::unbound(Point::new(120., 60.), Heading::Left);
        let layout = plan_layout(&start, &end, &cfg);
        assert_eq!(layout.start_obstacle, BoundingBox::new(-20., -20., 109., 70.));
        assert_eq!(layout.end_obstacle, BoundingBox::new(118., 58., 122., 62.));

        // unbound end inside the start shape: split at the center midpoint,
        // but the exit side still reaches the start point
        let end = ResolvedEndpoint::unbound(Point::new(90., 25.), Heading::Right);
        let layout = plan_layout(&start, &end, &cfg);
        assert_eq!(layout.start_obstacle, BoundingBox::new(-20., -20., 105., 70.));
        assert_eq!(layout.end_obstacle, BoundingBox::new(88., 23., 92., 27.));
        assert_eq!(layout.start_entry, Point::new(105., 25.));
    }

    #[test]
    fn test_split_keeps_exit_side() {
        let cfg = RouterConfig::default();
        for (case, start, end) in [
            (
                "leaving downwards past an end inside the shape",
                bound(
                    Point::new(16., 75.),
                    BoundingBox::new(0., 0., 40., 70.),
                    Heading::Down,
                ),
                ResolvedEndpoint::unbound(Point::new(4., 58.), Heading::Down),
            ),
            (
                "leaving upwards past an end inside the shape",
                bound(
                    Point::new(16., -5.),
                    BoundingBox::new(0., 0., 40., 70.),
                    Heading::Up,
                ),
                ResolvedEndpoint::unbound(Point::new(4., 12.), Heading::Up),
            ),
        ] {
            let layout = plan_layout(&start, &end, &cfg);
            let entry = layout.start_entry;
            // the grid entry lies on or beyond the start point, never behind it
            let reach = (entry.y - start.point.y) * start.heading.sign();
            assert!(reach >= 0., "{case}: entry {entry:?}");
            assert_eq!(entry.x, start.point.x, "{case}");
        }
    }

    #[test]
    fn test_unbound_points() {
        let cfg = RouterConfig::default();
        let start = ResolvedEndpoint::unbound(Point::new(0., 0.), Heading::Right);
        let end = ResolvedEndpoint::unbound(Point::new(100., 50.), Heading::Left);
        let layout = plan_layout(&start, &end, &cfg);
        assert_eq!(layout.start_obstacle, BoundingBox::new(-2., -2., 2., 2.));
        assert_eq!(layout.start_entry, Point::new(2., 0.));
        assert_eq!(layout.end_entry, Point::new(98., 50.));
    }
}
