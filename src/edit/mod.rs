//! Interactive editing of routed connectors.
//!
//! A connector may carry pinned ("fixed") segments which the user has
//! dragged into place. Edits keep those segments where they are and only
//! re-route the parts of the path around them.

mod cleanup;
mod fixed;
mod fixup;
mod release;

pub use cleanup::{cleanup, insert_corner, sanitize};
pub use fixed::{FixedSegment, RawFixedSegment};
pub use fixup::fixup_start;

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{clamp_coord, Point};
use crate::route::{plan_layout, ElbowRouter, EndpointSpec, ResolvedEndpoint};
use crate::shapes::{BindingResolver, ShapeLookup};
use cleanup::reverse_path;
use release::move_segment;

/// The change that prompted an edit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathEdit {
    /// Endpoints, bindings or shapes moved
    #[default]
    Geometry,
    /// Unpin the given segments
    Release { indices: Vec<usize> },
    /// Drag a segment to a new axis value and pin it there
    Move { index: usize, position: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditRequest {
    /// The connector's current path
    pub points: Vec<Point>,
    pub fixed_segments: Vec<FixedSegment>,
    pub start: EndpointSpec,
    pub end: EndpointSpec,
    pub edit: PathEdit,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditedPath {
    pub points: Vec<Point>,
    pub fixed_segments: Vec<FixedSegment>,
}

impl EditedPath {
    fn unpinned(points: Vec<Point>) -> Self {
        Self {
            points,
            fixed_segments: vec![],
        }
    }
}

impl<S: ShapeLookup + ?Sized, B: BindingResolver> ElbowRouter<'_, S, B> {
    /// Apply an edit to an existing connector path.
    ///
    /// Never fails: invalid pins are dropped and a path too short to edit is
    /// routed from scratch.
    pub fn edit_path(&self, request: &EditRequest) -> EditedPath {
        let cfg = &self.config;
        let tol = cfg.dedup_threshold;
        let (start, end) = self.resolve(&request.start, &request.end);

        let mut points: Vec<Point> = request
            .points
            .iter()
            .map(|p| p.clamped(cfg.position_bound))
            .collect();
        if points.len() < 2 {
            debug!("no path to edit; routing from scratch");
            return EditedPath::unpinned(self.route_resolved(&start, &end));
        }
        let mut pins = sanitize(&mut points, &request.fixed_segments, tol);

        let allow_flip = match &request.edit {
            PathEdit::Geometry => {
                if pins.is_empty() {
                    return EditedPath::unpinned(self.route_resolved(&start, &end));
                }
                let (start_pad, end_pad) = self.exit_padding(&start, &end);
                self.fixup_end(&mut points, &mut pins, &start, start_pad);
                reverse_path(&mut points, &mut pins);
                self.fixup_end(&mut points, &mut pins, &end, end_pad);
                reverse_path(&mut points, &mut pins);
                true
            }
            PathEdit::Release { indices } => {
                self.release_pins(&mut points, &mut pins, indices, &start, &end);
                false
            }
            PathEdit::Move { index, position } => {
                let position = clamp_coord(*position, cfg.position_bound);
                move_segment(
                    &mut points,
                    &mut pins,
                    *index,
                    position,
                    cfg.fixed_segment_padding,
                    tol,
                );
                false
            }
        };

        for p in points.iter_mut() {
            *p = p.clamped(cfg.position_bound);
        }
        cleanup(&mut points, &mut pins, allow_flip, tol);
        EditedPath {
            points,
            fixed_segments: pins,
        }
    }

    /// Minimum exit run at each end: the fixed-segment padding, or the
    /// distance a fresh route would travel to clear the endpoint's padded
    /// shape if that is longer.
    fn exit_padding(&self, start: &ResolvedEndpoint, end: &ResolvedEndpoint) -> (f64, f64) {
        let min = self.config.fixed_segment_padding;
        let layout = plan_layout(start, end, &self.config);
        (
            min.max(layout.start_entry.manhattan(&start.point)),
            min.max(layout.end_entry.manhattan(&end.point)),
        )
    }
}
