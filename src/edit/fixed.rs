use serde_derive::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::geometry::{Axis, Heading, Point};

/// A pinned straight segment of a connector path.
///
/// The segment runs from `points[index - 1]` to `points[index]`; `start` and
/// `end` record those positions as last seen by the editor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FixedSegment {
    pub index: usize,
    pub start: Point,
    pub end: Point,
}

/// Wire form of a `FixedSegment` with every field optional, so missing
/// fields can be reported as format errors.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFixedSegment {
    index: Option<i64>,
    start: Option<Point>,
    end: Option<Point>,
}

impl TryFrom<RawFixedSegment> for FixedSegment {
    type Error = Error;

    fn try_from(raw: RawFixedSegment) -> Result<Self> {
        let index = raw
            .index
            .ok_or_else(|| Error::Format("fixed segment missing field `index`".into()))?;
        let start = raw
            .start
            .ok_or_else(|| Error::Format("fixed segment missing field `start`".into()))?;
        let end = raw
            .end
            .ok_or_else(|| Error::Format("fixed segment missing field `end`".into()))?;
        if index <= 0 {
            return Err(Error::Format(format!(
                "fixed segment index must be positive, got {index}"
            )));
        }
        let index = usize::try_from(index)
            .map_err(|_| Error::Format(format!("fixed segment index out of range: {index}")))?;
        Ok(Self { index, start, end })
    }
}

impl FixedSegment {
    pub fn new(index: usize, start: Point, end: Point) -> Self {
        Self { index, start, end }
    }

    /// Segment `index` of the given path, if it exists
    pub fn from_points(points: &[Point], index: usize) -> Option<Self> {
        if index == 0 || index >= points.len() {
            return None;
        }
        Some(Self::new(index, points[index - 1], points[index]))
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawFixedSegment = serde_json::from_str(input)?;
        raw.try_into()
    }

    pub fn list_from_json(input: &str) -> Result<Vec<Self>> {
        let raw: Vec<RawFixedSegment> = serde_json::from_str(input)?;
        raw.into_iter().map(Self::try_from).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn list_to_json(segments: &[Self]) -> Result<String> {
        Ok(serde_json::to_string(segments)?)
    }

    /// Axis of the stored segment, within `tol`
    pub fn axis(&self, tol: f64) -> Option<Axis> {
        Axis::of_segment(self.start, self.end, tol)
    }

    pub fn is_horizontal(&self) -> bool {
        (self.end.y - self.start.y).abs() <= (self.end.x - self.start.x).abs()
    }

    /// The coordinate shared by both ends: y for a horizontal segment, x for
    /// a vertical one.
    pub fn axis_value(&self) -> f64 {
        if self.is_horizontal() {
            self.start.y
        } else {
            self.start.x
        }
    }

    pub fn length(&self) -> f64 {
        self.start.manhattan(&self.end)
    }

    /// Direction of travel from `start` to `end`
    pub fn heading(&self) -> Heading {
        Heading::between(self.start, self.end)
    }
}
