use tracing::trace;

use super::grid::{Grid, GridNode};
use super::{ObstacleLayout, ResolvedEndpoint};
use crate::constants::INTERIOR_EPSILON;
use crate::geometry::{Axis, BoundingBox, Heading, Point};

/// Binary min-heap of node indices keyed on the nodes' `f` cost.
///
/// `slots` records where each node currently sits in the heap, so a node
/// whose cost improves can be re-sifted in place.
struct OpenSet {
    heap: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl OpenSet {
    fn new(node_count: usize) -> Self {
        Self {
            heap: Vec::new(),
            slots: vec![None; node_count],
        }
    }

    fn push(&mut self, idx: usize, nodes: &[GridNode]) {
        self.heap.push(idx);
        self.slots[idx] = Some(self.heap.len() - 1);
        self.bubble_up(self.heap.len() - 1, nodes);
    }

    fn pop(&mut self, nodes: &[GridNode]) -> Option<usize> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let out = self.heap.pop()?;
        self.slots[out] = None;
        if !self.heap.is_empty() {
            self.sink_down(0, nodes);
        }
        Some(out)
    }

    /// Restore heap order after the cost of `idx` decreased.
    fn decreased(&mut self, idx: usize, nodes: &[GridNode]) {
        if let Some(pos) = self.slots[idx] {
            self.bubble_up(pos, nodes);
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a]] = Some(a);
        self.slots[self.heap[b]] = Some(b);
    }

    fn less(&self, a: usize, b: usize, nodes: &[GridNode]) -> bool {
        nodes[self.heap[a]].f < nodes[self.heap[b]].f
    }

    fn bubble_up(&mut self, mut i: usize, nodes: &[GridNode]) {
        while i > 0 {
            let parent = (i - 1) / 2;
            // strict comparison keeps earlier insertions ahead on ties
            if self.less(i, parent, nodes) {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sink_down(&mut self, mut i: usize, nodes: &[GridNode]) {
        let n = self.heap.len();
        loop {
            let mut smallest = i;
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            if left < n && self.less(left, smallest, nodes) {
                smallest = left;
            }
            if right < n && self.less(right, smallest, nodes) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}

/// Per-search constants shared by the cost functions.
struct SearchContext<'a> {
    start: &'a ResolvedEndpoint,
    end: &'a ResolvedEndpoint,
    start_idx: usize,
    goal_idx: usize,
    goal: Point,
    obstacles: Vec<BoundingBox>,
    /// Manhattan distance between the entry points
    base: f64,
    tolerance: f64,
}

impl SearchContext<'_> {
    fn heuristic(&self, pos: Point, heading: Heading) -> f64 {
        let entry_axis = self.end.heading.axis();
        let aligned = if entry_axis == Axis::Horizontal {
            (pos.y - self.goal.y).abs() <= self.tolerance
        } else {
            (pos.x - self.goal.x).abs() <= self.tolerance
        };
        let extra = if heading.axis() == entry_axis && aligned {
            0.
        } else {
            self.base.powi(2)
        };
        pos.manhattan(&self.goal) + extra
    }

    fn allowed(
        &self,
        from: &GridNode,
        from_idx: usize,
        to: &GridNode,
        to_idx: usize,
        heading: Heading,
    ) -> bool {
        if from.heading == Some(heading.opposite()) {
            return false;
        }
        if from_idx == self.start_idx && self.start.is_bound && heading != self.start.heading {
            return false;
        }
        if to_idx == self.goal_idx {
            if self.end.is_bound {
                if heading != self.end.heading.opposite() {
                    return false;
                }
            } else if heading == self.end.heading {
                return false;
            }
        }
        !self
            .obstacles
            .iter()
            .any(|obs| obs.segment_intersects_interior(from.pos, to.pos))
    }
}

/// Search the grid for a route between the layout's entry points.
///
/// Returns the grid points from start entry to end entry, or `None` when
/// no route satisfies the heading and obstacle constraints.
pub fn find_path(
    grid: &mut Grid,
    layout: &ObstacleLayout,
    start: &ResolvedEndpoint,
    end: &ResolvedEndpoint,
    tolerance: f64,
) -> Option<Vec<Point>> {
    let start_idx = grid.locate(layout.start_entry)?;
    let goal_idx = grid.locate(layout.end_entry)?;

    let s_obs = layout.start_obstacle.shrunk(INTERIOR_EPSILON);
    let e_obs = layout.end_obstacle.shrunk(INTERIOR_EPSILON);
    let obstacles = if e_obs.contains_interior(layout.start_entry)
        || s_obs.contains_interior(layout.end_entry)
    {
        trace!("entry point inside opposing obstacle; searching without obstacles");
        vec![]
    } else {
        vec![s_obs, e_obs]
    };

    let ctx = SearchContext {
        start,
        end,
        start_idx,
        goal_idx,
        goal: grid.node(goal_idx).pos,
        obstacles,
        base: layout.start_entry.manhattan(&layout.end_entry),
        tolerance,
    };

    {
        let root = grid.node_mut(start_idx);
        root.heading = Some(start.heading);
        root.visited = true;
    }
    let h = ctx.heuristic(grid.node(start_idx).pos, start.heading);
    {
        let root = grid.node_mut(start_idx);
        root.h = h;
        root.f = h;
    }

    let mut open = OpenSet::new(grid.len());
    open.push(start_idx, grid.nodes());
    let mut expanded = 0usize;

    while let Some(current) = open.pop(grid.nodes()) {
        if current == goal_idx {
            trace!("grid search expanded {expanded} of {} nodes", grid.len());
            return Some(grid.path_to(current));
        }
        grid.node_mut(current).closed = true;
        expanded += 1;

        for heading in Heading::ALL {
            let Some(next) = grid.neighbor(current, heading) else {
                continue;
            };
            let (from, to) = (grid.node(current), grid.node(next));
            if to.closed || !ctx.allowed(from, current, to, next, heading) {
                continue;
            }
            let bend = if from.heading == Some(heading) {
                0.
            } else {
                ctx.base.powi(3)
            };
            let g = from.g + from.pos.manhattan(&to.pos) + bend;
            if to.visited && g >= to.g {
                continue;
            }
            let h = ctx.heuristic(to.pos, heading);
            let was_visited = to.visited;
            {
                let node = grid.node_mut(next);
                node.g = g;
                node.h = h;
                node.f = g + h;
                node.parent = Some(current);
                node.heading = Some(heading);
                node.visited = true;
            }
            if was_visited {
                open.decreased(next, grid.nodes());
            } else {
                open.push(next, grid.nodes());
            }
        }
    }
    trace!("grid search exhausted after {expanded} nodes");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::plan_layout;
    use crate::RouterConfig;
    use itertools::Itertools;

    fn bound(point: Point, bounds: BoundingBox, heading: Heading) -> ResolvedEndpoint {
        ResolvedEndpoint {
            bounds: Some(bounds),
            is_bound: true,
            ..ResolvedEndpoint::unbound(point, heading)
        }
    }

    fn search(start: &ResolvedEndpoint, end: &ResolvedEndpoint) -> Option<Vec<Point>> {
        let layout = plan_layout(start, end, &RouterConfig::default());
        let mut grid = Grid::build(&layout, start, end);
        find_path(&mut grid, &layout, start, end, 1.)
    }

    #[test]
    fn test_open_set_order() {
        let mut grid = Grid::build(
            &plan_layout(
                &ResolvedEndpoint::unbound(Point::new(0., 0.), Heading::Right),
                &ResolvedEndpoint::unbound(Point::new(100., 50.), Heading::Left),
                &RouterConfig::default(),
            ),
            &ResolvedEndpoint::unbound(Point::new(0., 0.), Heading::Right),
            &ResolvedEndpoint::unbound(Point::new(100., 50.), Heading::Left),
        );
        for (idx, f) in [(0, 5.), (1, 3.), (2, 9.), (3, 1.), (4, 7.)] {
            grid.node_mut(idx).f = f;
        }
        let mut open = OpenSet::new(grid.len());
        for idx in 0..5 {
            open.push(idx, grid.nodes());
        }
        grid.node_mut(2).f = 0.;
        open.decreased(2, grid.nodes());

        let mut order = vec![];
        while let Some(idx) = open.pop(grid.nodes()) {
            order.push(idx);
        }
        assert_eq!(order, vec![2, 3, 1, 0, 4]);
    }

    #[test]
    fn test_route_around_shape() {
        // start exits the top of a shape, end is directly below it
        let start = bound(
            Point::new(50., -5.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Up,
        );
        let end = ResolvedEndpoint::unbound(Point::new(50., 300.), Heading::Up);
        let path = search(&start, &end).expect("route exists");
        assert_eq!(path.first(), Some(&Point::new(50., -40.)));
        assert_eq!(path.last(), Some(&Point::new(50., 298.)));
        // first move continues up and out of the padded shape
        let obstacle = BoundingBox::new(-20., -40., 120., 70.).shrunk(INTERIOR_EPSILON);
        for (a, b) in path.iter().tuple_windows() {
            assert!(a.x == b.x || a.y == b.y, "{a:?} -> {b:?}");
            assert!(!obstacle.segment_intersects_interior(*a, *b), "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn test_bound_end_entry() {
        let start = bound(
            Point::new(105., 25.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Right,
        );
        let end = bound(
            Point::new(350., 195.),
            BoundingBox::new(300., 200., 400., 250.),
            Heading::Up,
        );
        let path = search(&start, &end).expect("route exists");
        assert_eq!(
            path,
            vec![
                Point::new(140., 25.),
                Point::new(280., 25.),
                Point::new(350., 25.),
                Point::new(350., 70.),
                Point::new(350., 160.),
            ]
        );
    }

    #[test]
    fn test_first_hop_follows_heading_with_end_inside_shape() {
        // the end sits inside the start shape, so the obstacles are split;
        // the route must still leave downwards from the bottom edge
        let start = bound(
            Point::new(16., 75.),
            BoundingBox::new(0., 0., 40., 70.),
            Heading::Down,
        );
        let end = ResolvedEndpoint::unbound(Point::new(4., 58.), Heading::Down);
        let path = search(&start, &end).expect("route exists");
        assert_eq!(path[0], Point::new(16., 75.));
        assert_eq!(Heading::between(path[0], path[1]), Heading::Down);
        assert_eq!(path.last(), Some(&Point::new(4., 60.)));
    }

    #[test]
    fn test_unbound_end_rejects_only_exact_reverse() {
        // unbound end whose nominal heading is Right (towards the start) may
        // be entered from any direction except travelling Right
        let start = bound(
            Point::new(105., 25.),
            BoundingBox::new(0., 0., 100., 50.),
            Heading::Right,
        );
        let end = ResolvedEndpoint::unbound(Point::new(300., 25.), Heading::Left);
        let path = search(&start, &end).expect("route exists");
        assert_eq!(path, vec![Point::new(140., 25.), Point::new(298., 25.)]);

        // end "behind" the start heading: travel Right into it is forbidden
        let end = ResolvedEndpoint::unbound(Point::new(300., 25.), Heading::Right);
        let path = search(&start, &end).expect("route exists");
        let n = path.len();
        assert!(n >= 3);
        assert_ne!(
            Heading::between(path[n - 2], path[n - 1]),
            Heading::Right
        );
    }
}
