use super::{ObstacleLayout, ResolvedEndpoint};
use crate::geometry::{Heading, Point};

/// Coordinates closer than this are merged when building grid lines
const COORD_EPSILON: f64 = 1e-9;

/// A node of the routing grid.
///
/// `parent` indexes into the owning grid's node list, so the search tree
/// never holds references.
#[derive(Clone, Debug, PartialEq)]
pub struct GridNode {
    pub pos: Point,
    /// (col, row)
    pub addr: (usize, usize),
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub visited: bool,
    pub closed: bool,
    pub parent: Option<usize>,
    /// Direction of travel on arrival at this node
    pub heading: Option<Heading>,
}

impl GridNode {
    fn new(pos: Point, addr: (usize, usize)) -> Self {
        Self {
            pos,
            addr,
            g: 0.,
            h: 0.,
            f: 0.,
            visited: false,
            closed: false,
            parent: None,
            heading: None,
        }
    }
}

/// Sparse routing grid: one line for each interesting x and y coordinate.
#[derive(Clone, Debug)]
pub struct Grid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    nodes: Vec<GridNode>,
}

fn grid_lines(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut lines: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    lines.sort_by(f64::total_cmp);
    lines.dedup_by(|a, b| (*a - *b).abs() <= COORD_EPSILON);
    lines
}

fn find_line(lines: &[f64], value: f64) -> Option<usize> {
    let idx = lines.partition_point(|v| *v < value - COORD_EPSILON);
    lines
        .get(idx)
        .filter(|v| (**v - value).abs() <= COORD_EPSILON)
        .map(|_| idx)
}

impl Grid {
    /// Build the grid for a layout.
    ///
    /// Lines pass through every obstacle edge, both entry points and the
    /// common bounds; an endpoint with a vertical heading also contributes
    /// its x coordinate (and a horizontal heading its y), so the exit run is
    /// always a grid line.
    pub fn build(
        layout: &ObstacleLayout,
        start: &ResolvedEndpoint,
        end: &ResolvedEndpoint,
    ) -> Self {
        let (so, eo, cb) = (
            &layout.start_obstacle,
            &layout.end_obstacle,
            &layout.common_bounds,
        );
        let mut x_values = vec![
            so.x1,
            so.x2,
            eo.x1,
            eo.x2,
            cb.x1,
            cb.x2,
            layout.start_entry.x,
            layout.end_entry.x,
        ];
        let mut y_values = vec![
            so.y1,
            so.y2,
            eo.y1,
            eo.y2,
            cb.y1,
            cb.y2,
            layout.start_entry.y,
            layout.end_entry.y,
        ];
        for ep in [start, end] {
            if ep.heading.is_horizontal() {
                y_values.push(ep.point.y);
            } else {
                x_values.push(ep.point.x);
            }
        }
        Self::from_lines(grid_lines(x_values), grid_lines(y_values))
    }

    fn from_lines(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let mut nodes = Vec::with_capacity(xs.len() * ys.len());
        for (row, y) in ys.iter().enumerate() {
            for (col, x) in xs.iter().enumerate() {
                nodes.push(GridNode::new(Point::new(*x, *y), (col, row)));
            }
        }
        Self { xs, ys, nodes }
    }

    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols() + col
    }

    pub fn node(&self, idx: usize) -> &GridNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut GridNode {
        &mut self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    /// Node index at the given position, if it lies on a grid intersection
    pub fn locate(&self, p: Point) -> Option<usize> {
        let col = find_line(&self.xs, p.x)?;
        let row = find_line(&self.ys, p.y)?;
        Some(self.index(col, row))
    }

    /// Adjacent node in the given direction
    pub fn neighbor(&self, idx: usize, heading: Heading) -> Option<usize> {
        let (col, row) = self.nodes[idx].addr;
        let (col, row) = match heading {
            Heading::Up => (col, row.checked_sub(1)?),
            Heading::Down => (col, row + 1),
            Heading::Left => (col.checked_sub(1)?, row),
            Heading::Right => (col + 1, row),
        };
        (col < self.cols() && row < self.rows()).then(|| self.index(col, row))
    }

    /// Positions from the search root to `idx`, following parent links
    pub fn path_to(&self, idx: usize) -> Vec<Point> {
        let mut path = vec![self.nodes[idx].pos];
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            path.push(self.nodes[parent].pos);
            current = parent;
        }
        path.reverse();
        path
    }
}
