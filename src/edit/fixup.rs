use tracing::debug;

use super::cleanup::{insert_corner, is_pinned, pin_at, remove_point, shift_pins};
use super::FixedSegment;
use crate::geometry::{Axis, Heading, Point};
use crate::route::{ElbowRouter, ResolvedEndpoint};
use crate::shapes::{BindingResolver, ShapeLookup};

/// Whether moving `points[1]` to `value` across `axis` keeps a pinned
/// segment 2 pointing the same way with some length left.
fn keeps_pinned_neighbor(
    points: &[Point],
    pins: &[FixedSegment],
    cross: Axis,
    value: f64,
    tol: f64,
) -> bool {
    if !is_pinned(pins, 2) {
        return true;
    }
    let far = points[2].along(cross);
    let before = far - points[1].along(cross);
    let after = far - value;
    after.abs() > tol && after.signum() == before.signum()
}

/// Largest exit run the first corner may slide out to without eating more
/// than half of a pinned segment 3 running the same way as the exit.
fn slide_limit(points: &[Point], pins: &[FixedSegment], heading: Heading) -> Option<f64> {
    let pin = pin_at(pins, 3)?;
    if pin.heading() != heading {
        return None;
    }
    let axis = heading.axis();
    let start = points[0].along(axis);
    let far = points[3].along(axis);
    let len = (far - points[2].along(axis)) * heading.sign();
    Some((far - start) * heading.sign() - len / 2.)
}

/// Make the start of a path leave `endpoint` along its heading.
///
/// The end of a path is handled by running this on the reversed path.
/// Points are moved, inserted or removed as needed; pinned segments keep
/// their axis value and direction.
pub fn fixup_start(
    points: &mut Vec<Point>,
    pins: &mut Vec<FixedSegment>,
    endpoint: &ResolvedEndpoint,
    padding: f64,
    tol: f64,
) {
    let target = endpoint.point;
    let heading = endpoint.heading;
    let axis = heading.axis();
    let sign = heading.sign();
    if points.len() < 2 {
        *points = vec![target, target];
        return;
    }

    if is_pinned(pins, 1) {
        let pin_axis = Axis::of_segment(points[0], points[1], tol).unwrap_or(axis);
        let offset = target.along(pin_axis.cross()) - points[0].along(pin_axis.cross());
        if pin_axis == axis && offset.abs() <= tol {
            points[0] = target;
        } else {
            // the pinned segment stays; the endpoint hangs off its start
            points.insert(0, target);
            shift_pins(pins, 1, 1);
        }
    } else {
        points[0] = target;
    }

    if Axis::of_segment(points[0], points[1], tol) != Some(axis) {
        let cross = axis.cross();
        let neighbor_crosses = points.len() >= 3
            && Axis::of_segment(points[1], points[2], tol) == Some(cross);
        if neighbor_crosses && !is_pinned(pins, 1) {
            let reach = (points[1].along(axis) - target.along(axis)) * sign;
            let value = target.along(cross);
            if (!is_pinned(pins, 2) || reach >= padding - tol)
                && keeps_pinned_neighbor(points, pins, cross, value, tol)
            {
                points[1] = points[1].with_along(cross, value);
            }
        } else {
            insert_corner(points, pins, 0, axis, tol);
        }
    }

    let on_axis = Axis::of_segment(points[0], points[1], tol) == Some(axis);
    let reach = (points[1].along(axis) - target.along(axis)) * sign;
    if on_axis && reach >= padding - tol {
        return;
    }
    let slidable = on_axis
        && points.len() > 3
        && !is_pinned(pins, 2)
        && Axis::of_segment(points[1], points[2], tol) == Some(axis.cross());
    if slidable {
        let wanted = slide_limit(points, pins, heading).map_or(padding, |l| padding.min(l));
        if wanted > tol && wanted > reach {
            let value = target.along(axis) + sign * wanted;
            points[1] = points[1].with_along(axis, value);
            points[2] = points[2].with_along(axis, value);
            return;
        }
        if reach > tol {
            return;
        }
    } else if on_axis && reach > tol && is_pinned(pins, 2) {
        // a pinned corner segment caps the exit run
        return;
    }

    let stub = target.offset(heading, padding);
    if points.len() >= 3
        && !is_pinned(pins, 1)
        && !is_pinned(pins, 2)
        && Axis::of_segment(stub, points[1], tol) == Some(axis)
    {
        // the first corner sits behind the stub; route past it instead
        remove_point(points, pins, 1, None);
    }
    points.insert(1, stub);
    shift_pins(pins, 1, 1);
    insert_corner(points, pins, 1, axis.cross(), tol);
}

/// Whether the path leaves along `heading` and runs up to (and into) its
/// first pinned segment without doubling back on itself.
pub(crate) fn leaves_cleanly(
    points: &[Point],
    pins: &[FixedSegment],
    heading: Heading,
    tol: f64,
) -> bool {
    let last = pins
        .iter()
        .map(|p| p.index)
        .min()
        .unwrap_or(points.len() - 1)
        .min(points.len() - 1);
    let mut prev: Option<Heading> = None;
    for i in 1..=last {
        let (a, b) = (points[i - 1], points[i]);
        if a.approx_eq(&b, tol) {
            continue;
        }
        if Axis::of_segment(a, b, tol).is_none() {
            return false;
        }
        let h = Heading::between(a, b);
        match prev {
            None if h != heading => return false,
            Some(p) if p == h.opposite() => return false,
            _ => {}
        }
        prev = Some(h);
    }
    true
}

impl<S: ShapeLookup + ?Sized, B: BindingResolver> ElbowRouter<'_, S, B> {
    /// `fixup_start`, falling back to routing the unpinned lead-in afresh
    /// when local adjustments cannot produce a clean exit.
    pub(crate) fn fixup_end(
        &self,
        points: &mut Vec<Point>,
        pins: &mut Vec<FixedSegment>,
        endpoint: &ResolvedEndpoint,
        padding: f64,
    ) {
        let tol = self.config.dedup_threshold;
        fixup_start(points, pins, endpoint, padding, tol);
        if leaves_cleanly(points, pins, endpoint.heading, tol) {
            return;
        }
        let Some(first) = pins.iter().min_by_key(|p| p.index).cloned() else {
            return;
        };
        let k = first.index;
        if k < 2 {
            return;
        }
        debug!("re-routing lead-in to fixed segment {k}");
        let anchor = ResolvedEndpoint::unbound(points[k - 1], first.heading().opposite());
        let lead = self.search_route(endpoint, &anchor);
        let delta = lead.len() as isize - k as isize;
        points.splice(0..k, lead);
        shift_pins(pins, k, delta);
    }
}
