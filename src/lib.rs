//! elbowdx - orthogonal connector routing for diagrams
//!
//! Routes "elbow" connectors between two endpoints, either of which may be
//! bound to a rectangular shape. Paths consist only of horizontal and
//! vertical segments, leave bound shapes at right angles, avoid both end
//! shapes and use as few bends as the grid search can find.
//!
//! Routed connectors can then be edited: segments the user has dragged into
//! place are pinned as [`FixedSegment`]s, and later edits re-route only the
//! unpinned parts of the path.
//!
//! Coordinates are screen coordinates, with `y` increasing downwards.
//!
//! Basic use:
//!
//! ```
//! use elbowdx::{route_elbow_path, BoundingBox, Binding, Point, Shape};
//!
//! let shapes = vec![Shape::new("a", BoundingBox::new(0., 0., 100., 50.))];
//! let routed = route_elbow_path(
//!     Point::new(0., 0.),
//!     Point::new(300., 200.),
//!     Some(Binding::at("a", 1., 0.5)),
//!     None,
//!     shapes.as_slice(),
//!     false,
//!     true,
//! );
//! assert_eq!(routed.points.first(), Some(&Point::new(105., 25.)));
//! assert_eq!(routed.points.last(), Some(&Point::new(300., 200.)));
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod constants;
pub mod edit;
mod errors;
pub mod geometry;
pub mod json_api;
pub mod preview;
pub mod route;
pub mod shapes;

#[cfg(feature = "cli")]
use std::fs::{self, File};
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use tempfile::NamedTempFile;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use edit::{EditRequest, EditedPath, FixedSegment, PathEdit};
pub use errors::{Error, Result};
pub use geometry::{Axis, BoundingBox, Heading, Point};
pub use route::{ElbowRouter, EndpointSpec, RouteRequest, RoutedPath, SearchStrategy};
pub use shapes::{Binding, BindingResolver, FixedPointBinder, Shape, ShapeLookup};

use constants::{
    ARROWHEAD_BINDING_GAP, BASE_PADDING, BINDING_GAP, DEDUP_THRESHOLD, FIXED_SEGMENT_PADDING,
    MIN_ARROW_LENGTH, POINT_BOX_RADIUS, POSITION_BOUND, SIDE_PADDING,
};
use json_api::{route_json_with, RouteDocument};

/// Tunable parameters for routing and editing.
///
/// `Default` uses the values in [`constants`].
#[derive(Clone, Debug, PartialEq)]
pub struct RouterConfig {
    /// Obstacle clearance on the side a bound endpoint leaves from
    pub base_padding: f64,
    /// Obstacle clearance on the other three sides
    pub side_padding: f64,
    /// Half-size of the obstacle box around an unbound endpoint
    pub point_box_radius: f64,
    /// Points closer than this on both axes are the same point
    pub dedup_threshold: f64,
    pub min_arrow_length: f64,
    pub binding_gap: f64,
    pub arrowhead_binding_gap: f64,
    /// Minimum exit run kept by the editor next to a moved endpoint
    pub fixed_segment_padding: f64,
    pub position_bound: f64,
    pub strategy: SearchStrategy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_padding: BASE_PADDING,
            side_padding: SIDE_PADDING,
            point_box_radius: POINT_BOX_RADIUS,
            dedup_threshold: DEDUP_THRESHOLD,
            min_arrow_length: MIN_ARROW_LENGTH,
            binding_gap: BINDING_GAP,
            arrowhead_binding_gap: ARROWHEAD_BINDING_GAP,
            fixed_segment_padding: FIXED_SEGMENT_PADDING,
            position_bound: POSITION_BOUND,
            strategy: SearchStrategy::default(),
        }
    }
}

/// Output produced for a request document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Response document with the routed points and fixed segments
    #[default]
    Json,
    /// SVG preview of the shapes and the routed connector
    Svg,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(Error::Parse(format!("Unknown output format: {s}"))),
        }
    }
}

/// Route a connector with the default configuration and binder.
pub fn route_elbow_path<S: ShapeLookup + ?Sized>(
    start: Point,
    end: Point,
    start_binding: Option<Binding>,
    end_binding: Option<Binding>,
    shapes: &S,
    start_arrowhead: bool,
    end_arrowhead: bool,
) -> RoutedPath {
    let request = RouteRequest {
        start: EndpointSpec {
            point: start,
            binding: start_binding,
            arrowhead: start_arrowhead,
        },
        end: EndpointSpec {
            point: end,
            binding: end_binding,
            arrowhead: end_arrowhead,
        },
    };
    ElbowRouter::new(shapes, RouterConfig::default()).route(&request)
}

/// Apply an edit with the default configuration and binder.
pub fn edit_path<S: ShapeLookup + ?Sized>(request: &EditRequest, shapes: &S) -> EditedPath {
    ElbowRouter::new(shapes, RouterConfig::default()).edit_path(request)
}

/// Process a JSON request document into the given output format.
pub fn route_str(input: &str, format: OutputFormat, config: &RouterConfig) -> Result<String> {
    match format {
        OutputFormat::Json => route_json_with(input, config),
        OutputFormat::Svg => {
            let doc = RouteDocument::from_json(input)?;
            let path = doc.process(config)?;
            preview::render_svg(&doc.shapes(), &path)
        }
    }
}

/// Read a request from `input` and write the result to `output`.
///
/// Either may be `-` for stdin / stdout.
#[cfg(feature = "cli")]
pub fn route_file(
    input: &str,
    output: &str,
    format: OutputFormat,
    config: &RouterConfig,
) -> Result<()> {
    let mut request = String::new();
    if input == "-" {
        io::stdin().read_to_string(&mut request)?;
    } else {
        File::open(input)?.read_to_string(&mut request)?;
    }

    let result = route_str(&request, format, config)?;

    if output == "-" {
        let mut stdout = io::stdout();
        writeln!(stdout, "{result}")?;
    } else {
        let mut out_temp = NamedTempFile::new()?;
        writeln!(out_temp, "{result}")?;
        // Copy content rather than rename (by .persist()) since this
        // could cross filesystems.
        fs::copy(out_temp.path(), output)?;
    }
    Ok(())
}

/// JSON request in, JSON response out; the error is a display string.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn route_json(input: String) -> core::result::Result<String, String> {
    route_json_with(&input, &RouterConfig::default()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("svg".parse::<OutputFormat>().ok(), Some(OutputFormat::Svg));
        assert!("png".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_route_json_error_string() {
        let err = route_json("not json".into()).expect_err("invalid");
        assert!(err.starts_with("JSON error"), "{err}");
    }

    #[test]
    fn test_route_str_svg() {
        let input = r#"{"start": {"point": {"x": 0, "y": 0}}, "end": {"point": {"x": 100, "y": 0}}}"#;
        let svg = route_str(input, OutputFormat::Svg, &RouterConfig::default()).expect("svg");
        assert!(svg.contains(r#"<polyline points="0,0 100,0""#));
    }
}
