use itertools::Itertools;

use super::ResolvedEndpoint;
use crate::geometry::{Axis, Point};
use crate::RouterConfig;

/// Attach the true endpoints to a raw route, so it starts and ends exactly
/// on them.
fn reattach(mut points: Vec<Point>, start: Point, end: Point, tol: f64) -> Vec<Point> {
    match points.first() {
        None => return vec![start, end],
        Some(first) if first.approx_eq(&start, tol) => points[0] = start,
        Some(_) => points.insert(0, start),
    }
    if points.len() == 1 {
        points.push(end);
    } else if let Some(last) = points.last_mut() {
        if last.approx_eq(&end, tol) {
            *last = end;
        } else {
            points.push(end);
        }
    }
    points
}

/// Make a diagonal step orthogonal by adding a corner which continues the
/// previous segment's axis (`first_axis` for the very first segment).
fn insert_corners(points: &[Point], first_axis: Axis, tol: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len() * 2);
    let mut prev_axis = first_axis;
    for (idx, (&a, &b)) in points.iter().tuple_windows().enumerate() {
        if idx == 0 {
            out.push(a);
        }
        match Axis::of_segment(a, b, tol) {
            Some(axis) => prev_axis = axis,
            None => {
                let corner = match prev_axis {
                    Axis::Horizontal => Point::new(b.x, a.y),
                    Axis::Vertical => Point::new(a.x, b.y),
                };
                out.push(corner);
                prev_axis = prev_axis.cross();
            }
        }
        out.push(b);
    }
    if out.is_empty() {
        out.extend_from_slice(points);
    }
    out
}

/// Single simplification pass: drop interior points that repeat their
/// predecessor, then merge runs along the same axis.
fn simplify_once(points: &[Point], tol: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let mut out: Vec<Point> = Vec::with_capacity(n);
    out.push(points[0]);
    for &p in &points[1..n - 1] {
        if let Some(prev) = out.last() {
            if p.approx_eq(prev, tol) {
                continue;
            }
        }
        out.push(p);
    }
    let last = points[n - 1];
    if out.len() > 1 && out.last().is_some_and(|p| p.approx_eq(&last, tol)) {
        // keep the exact endpoint rather than the interior point next to it
        out.pop();
    }
    out.push(last);

    let mut merged: Vec<Point> = Vec::with_capacity(out.len());
    for p in out {
        if merged.len() >= 2 {
            let a = merged[merged.len() - 2];
            let b = merged[merged.len() - 1];
            let ab = Axis::of_segment(a, b, tol);
            if ab.is_some()
                && ab == Axis::of_segment(b, p, tol)
                && ab == Axis::of_segment(a, p, tol)
            {
                merged.pop();
            }
        }
        merged.push(p);
    }
    merged
}

/// Drop duplicate and collinear points until nothing more changes.
pub fn simplify(points: Vec<Point>, tol: f64) -> Vec<Point> {
    let mut points = points;
    loop {
        let next = simplify_once(&points, tol);
        if next == points {
            return next;
        }
        points = next;
    }
}

/// Turn a raw grid (or fallback) route into the final connector path.
pub fn post_process(
    points: Vec<Point>,
    start: &ResolvedEndpoint,
    end: &ResolvedEndpoint,
    config: &RouterConfig,
) -> Vec<Point> {
    let tol = config.dedup_threshold;
    let points = reattach(points, start.point, end.point, tol);
    let points = insert_corners(&points, start.heading.axis(), tol);
    simplify(points, tol)
        .into_iter()
        .map(|p| p.clamped(config.position_bound))
        .collect()
}
