#![allow(dead_code)]

use elbowdx::constants::{DEDUP_THRESHOLD, POSITION_BOUND};
use elbowdx::{Axis, Point};

pub fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Check the shape guarantees every routed or edited path provides.
pub fn check_path(case: &str, points: &[Point], start: Point, end: Point) {
    assert!(points.len() >= 2, "{case}: too few points {points:?}");
    assert_eq!(points.first(), Some(&start), "{case}: start {points:?}");
    assert_eq!(points.last(), Some(&end), "{case}: end {points:?}");

    for w in points.windows(2) {
        assert!(
            Axis::of_segment(w[0], w[1], DEDUP_THRESHOLD).is_some(),
            "{case}: diagonal step {:?} -> {:?} in {points:?}",
            w[0],
            w[1]
        );
        if points.len() > 2 {
            assert!(
                !w[0].approx_eq(&w[1], DEDUP_THRESHOLD),
                "{case}: zero-length segment at {:?} in {points:?}",
                w[0]
            );
        }
    }
    for w in points.windows(3) {
        let ab = Axis::of_segment(w[0], w[1], DEDUP_THRESHOLD);
        let bc = Axis::of_segment(w[1], w[2], DEDUP_THRESHOLD);
        assert_ne!(ab, bc, "{case}: collinear run through {:?} in {points:?}", w[1]);
    }
    for pt in points {
        assert!(
            pt.x.abs() <= POSITION_BOUND && pt.y.abs() <= POSITION_BOUND,
            "{case}: {pt:?} out of bounds"
        );
    }
}
