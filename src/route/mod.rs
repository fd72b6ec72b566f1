//! Elbow connector routing.
//!
//! A route request flows through endpoint resolution, obstacle layout, an
//! optional straight-line shortcut, the grid search and finally
//! post-processing. Every stage is total: failures degrade to a simpler
//! route rather than an error.

mod astar;
mod direct;
mod endpoint;
mod fallback;
mod grid;
mod layout;
mod postprocess;

pub use astar::find_path;
pub use direct::direct_route;
pub use endpoint::{resolve_endpoints, ResolvedEndpoint};
pub use fallback::fallback_path;
pub use grid::{Grid, GridNode};
pub use layout::{plan_layout, ObstacleLayout};
pub use postprocess::{post_process, simplify};

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::geometry::{Axis, Point};
use crate::shapes::{Binding, BindingResolver, FixedPointBinder, ShapeLookup};
use crate::RouterConfig;

/// How the router searches for a path once the direct route is ruled out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SearchStrategy {
    /// A* over the sparse grid
    #[default]
    #[cfg_attr(feature = "cli", value(name = "astar"))]
    AStar,
    /// Never search; every non-trivial route uses the fallback
    Disabled,
}

impl std::str::FromStr for SearchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "astar" | "a-star" => Ok(SearchStrategy::AStar),
            "disabled" => Ok(SearchStrategy::Disabled),
            _ => Err(Error::Parse(format!("Unknown search strategy: {s}"))),
        }
    }
}

/// One end of a connector as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Raw position; used as-is when the endpoint is unbound
    pub point: Point,
    #[serde(default)]
    pub binding: Option<Binding>,
    #[serde(default)]
    pub arrowhead: bool,
}

impl EndpointSpec {
    pub fn at(point: Point) -> Self {
        Self {
            point,
            binding: None,
            arrowhead: false,
        }
    }

    pub fn bound(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn with_arrowhead(mut self) -> Self {
        self.arrowhead = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    pub start: EndpointSpec,
    pub end: EndpointSpec,
}

/// A routed connector: at least two points, starting and ending exactly on
/// the resolved endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedPath {
    pub points: Vec<Point>,
    pub start: ResolvedEndpoint,
    pub end: ResolvedEndpoint,
}

/// Routes and edits connectors against a set of shapes.
pub struct ElbowRouter<'a, S: ShapeLookup + ?Sized, B: BindingResolver = FixedPointBinder> {
    pub(crate) shapes: &'a S,
    pub(crate) binder: B,
    pub(crate) config: RouterConfig,
}

impl<'a, S: ShapeLookup + ?Sized> ElbowRouter<'a, S> {
    /// Router using the default `FixedPointBinder` configured from `config`
    pub fn new(shapes: &'a S, config: RouterConfig) -> Self {
        let binder = FixedPointBinder::from_config(&config);
        Self {
            shapes,
            binder,
            config,
        }
    }
}

impl<'a, S: ShapeLookup + ?Sized, B: BindingResolver> ElbowRouter<'a, S, B> {
    pub fn with_binder(shapes: &'a S, binder: B, config: RouterConfig) -> Self {
        Self {
            shapes,
            binder,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn resolve(
        &self,
        start: &EndpointSpec,
        end: &EndpointSpec,
    ) -> (ResolvedEndpoint, ResolvedEndpoint) {
        resolve_endpoints(
            start,
            end,
            self.shapes,
            &self.binder,
            self.config.position_bound,
        )
    }

    /// Route a connector from scratch.
    pub fn route(&self, request: &RouteRequest) -> RoutedPath {
        let (start, end) = self.resolve(&request.start, &request.end);
        let points = self.route_resolved(&start, &end);
        RoutedPath { points, start, end }
    }

    /// Route between already-resolved endpoints.
    pub fn route_resolved(&self, start: &ResolvedEndpoint, end: &ResolvedEndpoint) -> Vec<Point> {
        let cfg = &self.config;
        let tol = cfg.dedup_threshold;

        if !start.is_bound && !end.is_bound {
            return if Axis::of_segment(start.point, end.point, tol).is_some() {
                vec![start.point, end.point]
            } else {
                fallback_path(start, end, cfg.min_arrow_length)
            };
        }
        self.search_route(start, end)
    }

    /// Layout, direct route, grid search and fallback, even between two
    /// unbound endpoints whose headings must be honoured.
    pub(crate) fn search_route(
        &self,
        start: &ResolvedEndpoint,
        end: &ResolvedEndpoint,
    ) -> Vec<Point> {
        let cfg = &self.config;
        let tol = cfg.dedup_threshold;
        let layout = plan_layout(start, end, cfg);
        if let Some(points) = direct_route(start, end, &layout, tol) {
            debug!("direct route");
            return post_process(points, start, end, cfg);
        }

        let found = match cfg.strategy {
            SearchStrategy::AStar => {
                let mut grid = Grid::build(&layout, start, end);
                find_path(&mut grid, &layout, start, end, tol)
            }
            SearchStrategy::Disabled => None,
        };
        let raw = found.unwrap_or_else(|| {
            debug!("no grid route; using fallback");
            fallback_path(start, end, cfg.min_arrow_length)
        });
        post_process(raw, start, end, cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Heading};
    use crate::shapes::Shape;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("astar".parse::<SearchStrategy>().ok(), Some(SearchStrategy::AStar));
        assert_eq!(
            "disabled".parse::<SearchStrategy>().ok(),
            Some(SearchStrategy::Disabled)
        );
        assert!("dijkstra".parse::<SearchStrategy>().is_err());
    }

    #[test]
    fn test_unbound_routes() {
        let shapes: Vec<Shape> = vec![];
        let router = ElbowRouter::new(&shapes, RouterConfig::default());
        let p = Point::new;
        for (case, s, e, expected) in [
            ("aligned", p(0., 0.), p(100., 0.), vec![p(0., 0.), p(100., 0.)]),
            (
                "short",
                p(0., 0.),
                p(5., 5.),
                vec![p(0., 0.), p(0., 2.5), p(5., 2.5), p(5., 5.)],
            ),
            (
                "long",
                p(0., 0.),
                p(100., 60.),
                vec![p(0., 0.), p(50., 0.), p(50., 60.), p(100., 60.)],
            ),
        ] {
            let routed = router.route(&RouteRequest {
                start: EndpointSpec::at(s),
                end: EndpointSpec::at(e),
            });
            assert_eq!(routed.points, expected, "{case}");
        }
    }

    #[test]
    fn test_disabled_strategy_uses_fallback() {
        let shapes = vec![
            Shape::new("a", BoundingBox::new(0., 0., 100., 50.)),
            Shape::new("b", BoundingBox::new(300., 200., 400., 250.)),
        ];
        let request = RouteRequest {
            start: EndpointSpec::at(Point::new(0., 0.)).bound(Binding::at("a", 1., 0.5)),
            end: EndpointSpec::at(Point::new(0., 0.)).bound(Binding::at("b", 0.5, 0.)),
        };
        let cfg = RouterConfig {
            strategy: SearchStrategy::Disabled,
            ..Default::default()
        };
        let routed = ElbowRouter::new(&shapes, cfg).route(&request);
        assert_eq!(routed.start.heading, Heading::Right);
        assert_eq!(routed.end.heading, Heading::Up);
        assert_eq!(
            routed.points,
            vec![
                Point::new(105., 25.),
                Point::new(227.5, 25.),
                Point::new(227.5, 195.),
                Point::new(350., 195.),
            ]
        );

        let routed = ElbowRouter::new(&shapes, RouterConfig::default()).route(&request);
        assert_eq!(
            routed.points,
            vec![
                Point::new(105., 25.),
                Point::new(350., 25.),
                Point::new(350., 195.),
            ]
        );
    }
}
