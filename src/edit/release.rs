use tracing::{debug, warn};

use super::cleanup::{insert_corner, shift_pins};
use super::FixedSegment;
use crate::geometry::{Axis, Heading, Point};
use crate::route::{ElbowRouter, ResolvedEndpoint};
use crate::shapes::{BindingResolver, ShapeLookup};

/// Two-leg path from `from` to `to` whose first leg runs along `axis`.
fn elbow(from: Point, to: Point, axis: Axis, tol: f64) -> Vec<Point> {
    let mut points = vec![from, to];
    insert_corner(&mut points, &mut [], 0, axis, tol);
    points
}

/// Whether `legs` turns straight back on the travel `arriving` at its first
/// point, or runs its last leg against the travel `leaving` its last point.
fn doubles_back(legs: &[Point], arriving: Heading, leaving: Heading, tol: f64) -> bool {
    let headings: Vec<Heading> = legs
        .windows(2)
        .filter(|w| !w[0].approx_eq(&w[1], tol))
        .map(|w| Heading::between(w[0], w[1]))
        .collect();
    match (headings.first(), headings.last()) {
        (Some(first), Some(last)) => {
            *first == arriving.opposite() || *last == leaving.opposite()
        }
        _ => false,
    }
}

impl<S: ShapeLookup + ?Sized, B: BindingResolver> ElbowRouter<'_, S, B> {
    /// Unpin the given segments and re-route each freed stretch of path.
    ///
    /// Points outside the freed stretches are left untouched.
    pub(crate) fn release_pins(
        &self,
        points: &mut Vec<Point>,
        pins: &mut Vec<FixedSegment>,
        indices: &[usize],
        start: &ResolvedEndpoint,
        end: &ResolvedEndpoint,
    ) {
        for idx in indices {
            if !pins.iter().any(|p| p.index == *idx) {
                warn!("cannot release segment {idx}: not fixed");
            }
        }
        let (freed, kept): (Vec<FixedSegment>, Vec<FixedSegment>) = pins
            .drain(..)
            .partition(|p| indices.contains(&p.index));
        *pins = kept;
        if freed.is_empty() {
            return;
        }

        let n = points.len();
        let gaps: Vec<usize> = (0..=pins.len())
            .filter(|&gap| {
                let lo = gap.checked_sub(1).map_or(0, |g| pins[g].index);
                let hi = pins.get(gap).map_or(n, |p| p.index);
                freed.iter().any(|f| f.index > lo && f.index < hi)
            })
            .collect();

        // right to left, so earlier pins keep their indices while splicing
        for gap in gaps.into_iter().rev() {
            let prev = gap.checked_sub(1).map(|g| pins[g].clone());
            let next = pins.get(gap).cloned();
            let a = prev.as_ref().map_or(0, |p| p.index);
            let b = next.as_ref().map_or(points.len() - 1, |p| p.index - 1);
            let region =
                self.reroute_region(points, a, b, prev.as_ref(), next.as_ref(), start, end);
            let delta = region.len() as isize - (b - a + 1) as isize;
            points.splice(a..=b, region);
            shift_pins(pins, b + 1, delta);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn reroute_region(
        &self,
        points: &[Point],
        a: usize,
        b: usize,
        prev: Option<&FixedSegment>,
        next: Option<&FixedSegment>,
        start: &ResolvedEndpoint,
        end: &ResolvedEndpoint,
    ) -> Vec<Point> {
        let tol = self.config.dedup_threshold;
        let (from, to) = (points[a], points[b]);

        // headings either side of the region, plus the preferred first-leg axis
        let ends = match (prev, next) {
            (Some(p), Some(n)) => Some((p.heading(), n.heading(), p.heading().axis().cross())),
            (Some(p), None) if !end.is_bound => Some((
                p.heading(),
                end.heading.opposite(),
                p.heading().axis().cross(),
            )),
            (None, Some(n)) if !start.is_bound => {
                Some((start.heading, n.heading(), n.heading().axis()))
            }
            _ => None,
        };
        if let Some((arriving, leaving, axis)) = ends {
            for axis in [axis, axis.cross()] {
                let legs = elbow(from, to, axis, tol);
                if !doubles_back(&legs, arriving, leaving, tol) {
                    return legs;
                }
            }
        }

        debug!("re-routing segments {a}..{b} with the full router");
        let s = match prev {
            Some(p) => ResolvedEndpoint::unbound(from, p.heading()),
            None => start.clone(),
        };
        let e = match next {
            Some(n) => ResolvedEndpoint::unbound(to, n.heading().opposite()),
            None => end.clone(),
        };
        self.search_route(&s, &e)
    }
}

/// Drag segment `index` so its axis value becomes `position`, and pin it.
///
/// A segment touching either end of the path first gets a stub and corner
/// there so the endpoint stays where it is.
pub(crate) fn move_segment(
    points: &mut Vec<Point>,
    pins: &mut Vec<FixedSegment>,
    index: usize,
    position: f64,
    padding: f64,
    tol: f64,
) {
    if index == 0 || index >= points.len() {
        warn!("cannot move segment {index}: outside path of {} points", points.len());
        return;
    }
    let Some(axis) = Axis::of_segment(points[index - 1], points[index], tol) else {
        warn!("cannot move segment {index}: not axis-aligned");
        return;
    };
    pins.retain(|p| p.index != index);

    let mut index = index;
    if index == 1 {
        let (first, second) = (points[0], points[1]);
        let len = first.manhattan(&second);
        let stub = first.offset(Heading::between(first, second), padding.min(len / 2.));
        points.splice(1..1, [stub, stub]);
        shift_pins(pins, 1, 2);
        index += 2;
    }
    if index == points.len() - 1 {
        let (last, before) = (points[index], points[index - 1]);
        let len = last.manhattan(&before);
        let stub = last.offset(Heading::between(last, before), padding.min(len / 2.));
        points.splice(index..index, [stub, stub]);
        shift_pins(pins, index, 2);
    }

    let cross = axis.cross();
    points[index - 1] = points[index - 1].with_along(cross, position);
    points[index] = points[index].with_along(cross, position);
    pins.push(FixedSegment::new(index, points[index - 1], points[index]));
    pins.sort_by_key(|p| p.index);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_elbow() {
        assert_eq!(
            elbow(p(0., 0.), p(50., 80.), Axis::Horizontal, 1.),
            vec![p(0., 0.), p(50., 0.), p(50., 80.)]
        );
        assert_eq!(
            elbow(p(0., 0.), p(0., 80.), Axis::Horizontal, 1.),
            vec![p(0., 0.), p(0., 80.)]
        );
    }

    #[test]
    fn test_move_segment() {
        let path = vec![p(0., 0.), p(100., 0.), p(100., 100.), p(200., 100.)];
        for (case, index, position, expected, pinned) in [
            (
                "interior",
                2,
                150.,
                vec![p(0., 0.), p(150., 0.), p(150., 100.), p(200., 100.)],
                2,
            ),
            (
                "touching start",
                1,
                40.,
                vec![
                    p(0., 0.),
                    p(20., 0.),
                    p(20., 40.),
                    p(100., 40.),
                    p(100., 100.),
                    p(200., 100.),
                ],
                3,
            ),
            (
                "touching end",
                3,
                50.,
                vec![
                    p(0., 0.),
                    p(100., 0.),
                    p(100., 50.),
                    p(180., 50.),
                    p(180., 100.),
                    p(200., 100.),
                ],
                3,
            ),
        ] {
            let mut points = path.clone();
            let mut pins = vec![];
            move_segment(&mut points, &mut pins, index, position, 20., 1.);
            assert_eq!(points, expected, "{case}");
            assert_eq!(
                pins,
                vec![FixedSegment::from_points(&points, pinned).expect("pinned")],
                "{case}"
            );
        }
    }

    #[test]
    fn test_move_ignores_bad_index() {
        let mut points = vec![p(0., 0.), p(100., 0.)];
        let mut pins = vec![];
        move_segment(&mut points, &mut pins, 5, 10., 20., 1.);
        move_segment(&mut points, &mut pins, 0, 10., 20., 1.);
        assert_eq!(points, vec![p(0., 0.), p(100., 0.)]);
        assert!(pins.is_empty());
    }

    #[test]
    fn test_move_two_point_path() {
        let mut points = vec![p(0., 0.), p(100., 0.)];
        let mut pins = vec![];
        move_segment(&mut points, &mut pins, 1, 30., 20., 1.);
        assert_eq!(
            points,
            vec![
                p(0., 0.),
                p(20., 0.),
                p(20., 30.),
                p(80., 30.),
                p(80., 0.),
                p(100., 0.),
            ]
        );
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].index, 3);
    }
}
