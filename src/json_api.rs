//! JSON request/response documents driving routing and editing.
//!
//! A single document describes the shapes, both endpoints and optionally
//! the connector's current path and pins. Without a path the connector is
//! routed from scratch; otherwise the requested edit is applied.

use serde_derive::{Deserialize, Serialize};

use crate::constants::JSON_API_VERSION;
use crate::edit::{EditRequest, EditedPath, FixedSegment, PathEdit, RawFixedSegment};
use crate::errors::{Error, Result};
use crate::geometry::{BoundingBox, Point};
use crate::route::{ElbowRouter, EndpointSpec, RouteRequest};
use crate::shapes::Shape;
use crate::RouterConfig;

fn default_version() -> u32 {
    JSON_API_VERSION
}

/// A shape as given in a request: top-left corner, size and rotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, clockwise about the center
    #[serde(default)]
    pub rotation: f64,
}

impl From<&ShapeSpec> for Shape {
    fn from(spec: &ShapeSpec) -> Self {
        let (x1, x2) = (spec.x.min(spec.x + spec.width), spec.x.max(spec.x + spec.width));
        let (y1, y2) = (spec.y.min(spec.y + spec.height), spec.y.max(spec.y + spec.height));
        Shape::new(spec.id.clone(), BoundingBox::new(x1, y1, x2, y2)).with_rotation(spec.rotation)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,
    pub start: EndpointSpec,
    pub end: EndpointSpec,
    /// Current connector path; empty to route from scratch
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub fixed_segments: Vec<RawFixedSegment>,
    #[serde(default)]
    pub edit: PathEdit,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteResponse {
    pub version: u32,
    pub points: Vec<Point>,
    pub fixed_segments: Vec<FixedSegment>,
}

impl From<EditedPath> for RouteResponse {
    fn from(path: EditedPath) -> Self {
        Self {
            version: JSON_API_VERSION,
            points: path.points,
            fixed_segments: path.fixed_segments,
        }
    }
}

impl RouteDocument {
    pub fn from_json(input: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(input)?;
        if doc.version != JSON_API_VERSION {
            return Err(Error::Format(format!(
                "Unsupported API version: {} (expected {JSON_API_VERSION})",
                doc.version
            )));
        }
        Ok(doc)
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.shapes.iter().map(Shape::from).collect()
    }

    /// Route or edit the connector this document describes.
    pub fn process(&self, config: &RouterConfig) -> Result<EditedPath> {
        let fixed_segments = self
            .fixed_segments
            .iter()
            .cloned()
            .map(FixedSegment::try_from)
            .collect::<Result<Vec<_>>>()?;
        let shapes = self.shapes();
        let router = ElbowRouter::new(&shapes, config.clone());

        if self.points.is_empty() {
            let routed = router.route(&RouteRequest {
                start: self.start.clone(),
                end: self.end.clone(),
            });
            return Ok(EditedPath {
                points: routed.points,
                fixed_segments: vec![],
            });
        }
        Ok(router.edit_path(&EditRequest {
            points: self.points.clone(),
            fixed_segments,
            start: self.start.clone(),
            end: self.end.clone(),
            edit: self.edit.clone(),
        }))
    }
}

/// Process a JSON request document, returning the JSON response.
pub fn route_json_with(input: &str, config: &RouterConfig) -> Result<String> {
    let doc = RouteDocument::from_json(input)?;
    let response: RouteResponse = doc.process(config)?.into();
    Ok(serde_json::to_string(&response)?)
}
