use tracing::debug;

use super::EndpointSpec;
use crate::constants::HEADING_CONE_SCALE;
use crate::geometry::{BoundingBox, Heading, Point};
use crate::shapes::{BindingResolver, ShapeLookup};

/// A connector endpoint after its binding (if any) has been applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEndpoint {
    /// Where the routed path starts or ends
    pub point: Point,
    /// World bounds of the bound shape
    pub bounds: Option<BoundingBox>,
    /// Point within the shape the binding refers to
    pub anchor: Option<Point>,
    /// Direction the path leaves this endpoint in
    pub heading: Heading,
    pub has_arrowhead: bool,
    pub is_bound: bool,
}

impl ResolvedEndpoint {
    /// An endpoint not attached to any shape
    pub fn unbound(point: Point, heading: Heading) -> Self {
        Self {
            point,
            bounds: None,
            anchor: None,
            heading,
            has_arrowhead: false,
            is_bound: false,
        }
    }
}

struct BoundPoint {
    point: Point,
    bounds: BoundingBox,
    anchor: Option<Point>,
}

fn bind<S, B>(spec: &EndpointSpec, shapes: &S, binder: &B, bound: f64) -> Option<BoundPoint>
where
    S: ShapeLookup + ?Sized,
    B: BindingResolver + ?Sized,
{
    let binding = spec.binding.as_ref()?;
    let Some(shape) = shapes.shape(&binding.shape_id) else {
        debug!("shape '{}' not found; endpoint is unbound", binding.shape_id);
        return None;
    };
    Some(BoundPoint {
        point: binder
            .boundary_point(binding, shape, spec.arrowhead)
            .clamped(bound),
        bounds: shape.world_bounds().clamped(bound),
        anchor: binder.anchor_point(binding, shape).map(|a| a.clamped(bound)),
    })
}

fn finish(
    spec: &EndpointSpec,
    own: Option<BoundPoint>,
    point: Point,
    other: Point,
) -> ResolvedEndpoint {
    match own {
        Some(bp) => ResolvedEndpoint {
            point,
            heading: bp
                .bounds
                .side_heading(bp.anchor.unwrap_or(point), HEADING_CONE_SCALE),
            bounds: Some(bp.bounds),
            anchor: bp.anchor,
            has_arrowhead: spec.arrowhead,
            is_bound: true,
        },
        None => ResolvedEndpoint {
            has_arrowhead: spec.arrowhead,
            ..ResolvedEndpoint::unbound(point, Heading::between(point, other))
        },
    }
}

/// Resolve both endpoints of a connector.
///
/// Bound endpoints are resolved first, so an unbound endpoint's heading
/// points towards the other endpoint's final position. A binding to a shape
/// which cannot be found degrades to an unbound endpoint.
pub fn resolve_endpoints<S, B>(
    start: &EndpointSpec,
    end: &EndpointSpec,
    shapes: &S,
    binder: &B,
    position_bound: f64,
) -> (ResolvedEndpoint, ResolvedEndpoint)
where
    S: ShapeLookup + ?Sized,
    B: BindingResolver + ?Sized,
{
    let start_bound = bind(start, shapes, binder, position_bound);
    let end_bound = bind(end, shapes, binder, position_bound);

    let start_point = start_bound
        .as_ref()
        .map_or(start.point.clamped(position_bound), |bp| bp.point);
    let end_point = end_bound
        .as_ref()
        .map_or(end.point.clamped(position_bound), |bp| bp.point);

    (
        finish(start, start_bound, start_point, end_point),
        finish(end, end_bound, end_point, start_point),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::POSITION_BOUND;
    use crate::shapes::{Binding, FixedPointBinder, Shape};

    fn shapes() -> Vec<Shape> {
        vec![
            Shape::new("a", BoundingBox::new(0., 0., 100., 50.)),
            Shape::new("b", BoundingBox::new(300., 200., 400., 260.)),
        ]
    }

    fn resolve(start: EndpointSpec, end: EndpointSpec) -> (ResolvedEndpoint, ResolvedEndpoint) {
        resolve_endpoints(
            &start,
            &end,
            &shapes(),
            &FixedPointBinder::default(),
            POSITION_BOUND,
        )
    }

    #[test]
    fn test_unbound_headings() {
        for (case, end, s_heading, e_heading) in [
            ("right", Point::new(100., 10.), Heading::Right, Heading::Left),
            ("below", Point::new(10., 100.), Heading::Down, Heading::Up),
            ("tie", Point::new(-50., -50.), Heading::Left, Heading::Right),
            ("same point", Point::new(0., 0.), Heading::Right, Heading::Right),
        ] {
            let (s, e) = resolve(
                EndpointSpec::at(Point::new(0., 0.)),
                EndpointSpec::at(end),
            );
            assert_eq!(s.heading, s_heading, "{case}");
            assert_eq!(e.heading, e_heading, "{case}");
            assert!(!s.is_bound && !e.is_bound, "{case}");
        }
    }

    #[test]
    fn test_bound_endpoint() {
        let (s, e) = resolve(
            EndpointSpec::at(Point::new(0., 0.)).bound(Binding::at("a", 0.5, 1.)),
            EndpointSpec::at(Point::new(-60., 100.)).with_arrowhead(),
        );
        assert!(s.is_bound);
        assert_eq!(s.point, Point::new(50., 55.));
        assert_eq!(s.anchor, Some(Point::new(50., 50.)));
        assert_eq!(s.heading, Heading::Down);
        assert_eq!(s.bounds, Some(BoundingBox::new(0., 0., 100., 50.)));
        // unbound end points back at the resolved start, not the raw point
        assert!(!e.is_bound);
        assert!(e.has_arrowhead);
        assert_eq!(e.heading, Heading::Right);
    }

    #[test]
    fn test_missing_shape() {
        let (s, _) = resolve(
            EndpointSpec::at(Point::new(10., 10.)).bound(Binding::new("nope")),
            EndpointSpec::at(Point::new(10., 200.)),
        );
        assert!(!s.is_bound);
        assert_eq!(s.point, Point::new(10., 10.));
        assert_eq!(s.heading, Heading::Down);
    }

    #[test]
    fn test_clamped_input() {
        let (s, e) = resolve(
            EndpointSpec::at(Point::new(-5e6, 0.)),
            EndpointSpec::at(Point::new(f64::NAN, 3e7)),
        );
        assert_eq!(s.point, Point::new(-POSITION_BOUND, 0.));
        assert_eq!(e.point, Point::new(0., POSITION_BOUND));
    }
}
