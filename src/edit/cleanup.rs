use tracing::warn;

use super::FixedSegment;
use crate::geometry::{Axis, Heading, Point};

pub(crate) fn pin_at(pins: &[FixedSegment], index: usize) -> Option<&FixedSegment> {
    pins.iter().find(|p| p.index == index)
}

pub(crate) fn is_pinned(pins: &[FixedSegment], index: usize) -> bool {
    pin_at(pins, index).is_some()
}

/// Add `delta` to the index of every pin at or after `from`.
pub(crate) fn shift_pins(pins: &mut [FixedSegment], from: usize, delta: isize) {
    for pin in pins.iter_mut().filter(|p| p.index >= from) {
        pin.index = pin.index.saturating_add_signed(delta);
    }
}

/// Remove `points[k]`, dropping the pin on segment `drop` if given.
///
/// Segments `k` and `k + 1` become one segment with index `k`.
pub(crate) fn remove_point(
    points: &mut Vec<Point>,
    pins: &mut Vec<FixedSegment>,
    k: usize,
    drop: Option<usize>,
) {
    points.remove(k);
    if let Some(d) = drop {
        pins.retain(|p| p.index != d);
    }
    for pin in pins.iter_mut().filter(|p| p.index > k) {
        pin.index -= 1;
    }
}

/// Reverse a path in place, keeping its pins on the same segments.
pub(crate) fn reverse_path(points: &mut [Point], pins: &mut [FixedSegment]) {
    let n = points.len();
    points.reverse();
    for pin in pins.iter_mut() {
        pin.index = n - pin.index;
        std::mem::swap(&mut pin.start, &mut pin.end);
    }
}

/// Insert a right-angle corner between `points[after]` and `points[after + 1]`
/// whose first leg runs along `axis`.
///
/// Returns whether a point was inserted; nothing happens if the two points
/// are already aligned or the corner would coincide with either of them.
pub fn insert_corner(
    points: &mut Vec<Point>,
    pins: &mut [FixedSegment],
    after: usize,
    axis: Axis,
    tol: f64,
) -> bool {
    let (Some(&a), Some(&b)) = (points.get(after), points.get(after + 1)) else {
        return false;
    };
    if Axis::of_segment(a, b, tol).is_some() {
        return false;
    }
    let corner = match axis {
        Axis::Horizontal => Point::new(b.x, a.y),
        Axis::Vertical => Point::new(a.x, b.y),
    };
    if corner.approx_eq(&a, tol) || corner.approx_eq(&b, tol) {
        return false;
    }
    points.insert(after + 1, corner);
    shift_pins(pins, after + 1, 1);
    true
}

/// Validate caller-supplied pins against the path.
///
/// Out-of-range, diagonal and duplicate pins are dropped; the survivors are
/// sorted and each one's axis value is written back onto its two points.
pub fn sanitize(points: &mut [Point], pins: &[FixedSegment], tol: f64) -> Vec<FixedSegment> {
    let mut sorted = pins.to_vec();
    sorted.sort_by_key(|p| p.index);

    let mut out: Vec<FixedSegment> = Vec::with_capacity(sorted.len());
    for pin in sorted {
        let idx = pin.index;
        if idx == 0 || idx >= points.len() {
            warn!("dropping fixed segment {idx}: outside path of {} points", points.len());
            continue;
        }
        if out.last().is_some_and(|p| p.index == idx) {
            warn!("dropping duplicate fixed segment {idx}");
            continue;
        }
        let Some(axis) = Axis::of_segment(points[idx - 1], points[idx], tol) else {
            warn!("dropping fixed segment {idx}: path segment is diagonal");
            continue;
        };
        if pin.axis(tol) != Some(axis) {
            warn!("dropping fixed segment {idx}: does not match path segment");
            continue;
        }
        let value = pin.start.along(axis.cross());
        points[idx - 1] = points[idx - 1].with_along(axis.cross(), value);
        points[idx] = points[idx].with_along(axis.cross(), value);
        out.push(FixedSegment::new(idx, points[idx - 1], points[idx]));
    }
    out
}

fn remove_zero_length(points: &mut Vec<Point>, pins: &mut Vec<FixedSegment>, tol: f64) {
    let mut i = 1;
    while i < points.len() {
        if points.len() > 2 && points[i - 1].approx_eq(&points[i], tol) {
            if i == points.len() - 1 {
                remove_point(points, pins, i - 1, Some(i));
            } else {
                remove_point(points, pins, i, Some(i));
            }
        } else {
            i += 1;
        }
    }
}

/// Merge runs along one axis. A run that doubles back is folded away only
/// when neither of its two segments is pinned.
fn merge_collinear(points: &mut Vec<Point>, pins: &mut Vec<FixedSegment>, tol: f64) {
    let mut k = 1;
    while k + 1 < points.len() {
        let (a, b, c) = (points[k - 1], points[k], points[k + 1]);
        let ab = Axis::of_segment(a, b, tol);
        if ab.is_none() || ab != Axis::of_segment(b, c, tol) {
            k += 1;
        } else if Heading::between(a, b) == Heading::between(b, c) {
            let drop = is_pinned(pins, k).then_some(k + 1);
            remove_point(points, pins, k, drop);
        } else if !is_pinned(pins, k) && !is_pinned(pins, k + 1) {
            remove_point(points, pins, k, None);
            k = k.saturating_sub(1).max(1);
        } else {
            k += 1;
        }
    }
}

/// Tidy an edited path and bring its pins up to date.
///
/// Pins whose direction reversed since they were sanitized survive only if
/// `allow_flip` is set.
pub fn cleanup(
    points: &mut Vec<Point>,
    pins: &mut Vec<FixedSegment>,
    allow_flip: bool,
    tol: f64,
) {
    loop {
        let before = points.len();
        remove_zero_length(points, pins, tol);
        merge_collinear(points, pins, tol);
        if points.len() == before {
            break;
        }
    }

    let n = points.len();
    pins.retain_mut(|pin| {
        let idx = pin.index;
        if idx == 0 || idx >= n {
            warn!("dropping fixed segment {idx}: outside edited path");
            return false;
        }
        let (s, e) = (points[idx - 1], points[idx]);
        if Axis::of_segment(s, e, tol).is_none() {
            warn!("dropping fixed segment {idx}: no longer axis-aligned");
            return false;
        }
        if !allow_flip && Heading::between(pin.start, pin.end) != Heading::between(s, e) {
            warn!("dropping fixed segment {idx}: direction flipped");
            return false;
        }
        pin.start = s;
        pin.end = e;
        true
    });
    pins.sort_by_key(|p| p.index);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn pin(points: &[Point], index: usize) -> FixedSegment {
        FixedSegment::from_points(points, index).expect("valid index")
    }

    #[test]
    fn test_insert_corner() {
        let mut points = vec![p(0., 0.), p(50., 30.), p(50., 80.)];
        let mut pins = vec![pin(&points, 2)];
        assert!(insert_corner(&mut points, &mut pins, 0, Axis::Horizontal, 1.));
        assert_eq!(points, vec![p(0., 0.), p(50., 0.), p(50., 30.), p(50., 80.)]);
        assert_eq!(pins[0].index, 3);

        assert!(!insert_corner(&mut points, &mut pins, 0, Axis::Vertical, 1.), "aligned");
        assert!(!insert_corner(&mut points, &mut pins, 3, Axis::Vertical, 1.), "out of range");

        let mut near = vec![p(0., 0.), p(30., 0.8)];
        assert!(!insert_corner(&mut near, &mut [], 0, Axis::Vertical, 1.));
        assert_eq!(near.len(), 2);
    }

    #[test]
    fn test_reverse_path() {
        let mut points = vec![p(0., 0.), p(10., 0.), p(10., 10.), p(20., 10.)];
        let mut pins = vec![pin(&points, 1)];
        reverse_path(&mut points, &mut pins);
        assert_eq!(pins[0].index, 3);
        assert_eq!(pins[0], pin(&points, 3));
        reverse_path(&mut points, &mut pins);
        assert_eq!(pins[0], pin(&points, 1));
    }

    #[test]
    fn test_sanitize() {
        let mut points = vec![p(0., 0.), p(100., 0.), p(100., 50.), p(160., 50.)];
        let pins = vec![
            FixedSegment::new(3, p(100., 52.), p(160., 52.)),
            FixedSegment::new(0, p(0., 0.), p(0., 0.)),
            FixedSegment::new(9, p(0., 0.), p(1., 0.)),
            FixedSegment::new(1, p(0., 0.), p(100., 0.)),
            FixedSegment::new(1, p(0., 0.), p(100., 0.)),
            FixedSegment::new(2, p(100., 0.), p(140., 0.)),
        ];
        let kept = sanitize(&mut points, &pins, 1.);
        assert_eq!(kept.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1, 3]);
        // stored axis value wins over the path
        assert_eq!(points[2], p(100., 52.));
        assert_eq!(points[3], p(160., 52.));
        assert_eq!(kept[1], FixedSegment::new(3, p(100., 52.), p(160., 52.)));
    }

    #[test]
    fn test_cleanup_merges_and_drops() {
        // zero-length segment 2 (pinned) and collinear run 3-4
        let mut points = vec![
            p(0., 0.),
            p(50., 0.),
            p(50., 0.5),
            p(50., 40.),
            p(50., 80.),
            p(90., 80.),
        ];
        let mut pins = vec![
            FixedSegment::new(2, p(50., 0.), p(50., 0.5)),
            FixedSegment::new(4, p(50., 40.), p(50., 80.)),
        ];
        cleanup(&mut points, &mut pins, false, 1.);
        assert_eq!(points, vec![p(0., 0.), p(50., 0.), p(50., 80.), p(90., 80.)]);
        assert_eq!(pins, vec![FixedSegment::new(2, p(50., 0.), p(50., 80.))]);
    }

    #[test]
    fn test_cleanup_folds_free_spikes() {
        let points = vec![
            p(0., 0.),
            p(50., 0.),
            p(50., -40.),
            p(50., 30.),
            p(100., 30.),
        ];
        for (case, pinned, expected) in [
            (
                "free spike",
                vec![],
                vec![p(0., 0.), p(50., 0.), p(50., 30.), p(100., 30.)],
            ),
            ("pinned spike stays", vec![3], points.clone()),
        ] {
            let mut points = points.clone();
            let mut pins: Vec<FixedSegment> = pinned.iter().map(|i| pin(&points, *i)).collect();
            cleanup(&mut points, &mut pins, false, 1.);
            assert_eq!(points, expected, "{case}");
            assert_eq!(pins.len(), pinned.len(), "{case}");
        }
    }

    #[test]
    fn test_cleanup_flip() {
        for (case, allow_flip, kept) in [("release", false, 0), ("geometry", true, 1)] {
            let mut points = vec![p(0., 0.), p(0., 50.), p(80., 50.), p(80., 100.)];
            let mut pins = vec![FixedSegment::new(2, p(80., 50.), p(0., 50.))];
            cleanup(&mut points, &mut pins, allow_flip, 1.);
            assert_eq!(pins.len(), kept, "{case}");
        }
    }
}
