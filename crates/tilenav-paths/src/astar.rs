//! A* search over a shared [`NavGrid`].
//!
//! Every search allocates its own scratch table (G/H/parent per cell
//! index), closed set and open [`Heap`], so any number of searches can run
//! at once against the same `Arc<NavGrid>`.

use std::sync::Arc;

use tilenav_core::{Point, Vec2};

use crate::distance::octile;
use crate::grid::NavGrid;
use crate::heap::Heap;
use crate::node::{NO_PARENT, OpenEntry, SearchNode};
use crate::simplify::simplify_path;

/// Raw result of a successful [`Pathfinder::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Every cell from start to goal, both included.
    pub cells: Vec<Point>,
    /// Total G cost of the path (step costs plus penalties).
    pub cost: i32,
    /// Number of cells expanded before the goal was reached.
    pub expanded: usize,
}

/// Outcome of a world-space path query.
///
/// `waypoints` is empty exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathResult {
    /// Corner points from just after the start to the goal.
    pub waypoints: Vec<Vec2>,
    pub success: bool,
    /// Total G cost, 0 on failure.
    pub cost: i32,
    /// Cells expanded during the search.
    pub expanded: usize,
}

impl PathResult {
    /// A failed result.
    pub fn failure() -> Self {
        Self::default()
    }
}

/// Runs A* searches against a shared grid.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    grid: Arc<NavGrid>,
}

impl Pathfinder {
    pub fn new(grid: Arc<NavGrid>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Arc<NavGrid> {
        &self.grid
    }

    /// Find a path between two world positions and simplify it into
    /// waypoints.
    ///
    /// Both positions snap to their nearest cell (clamping to the border
    /// when outside the world rectangle). The start cell is where the
    /// caller already stands and is left out of the waypoints unless it is
    /// also the goal.
    pub fn find_path(&self, start: Vec2, end: Vec2) -> PathResult {
        let from = self.grid.cell_from_world(start);
        let to = self.grid.cell_from_world(end);
        match self.search(from, to) {
            Some(outcome) => PathResult {
                waypoints: route_waypoints(&outcome.cells)
                    .iter()
                    .map(|&p| self.grid.world_from_cell(p))
                    .collect(),
                success: true,
                cost: outcome.cost,
                expanded: outcome.expanded,
            },
            None => PathResult::failure(),
        }
    }

    /// Shortest path between two cells.
    ///
    /// Returns `None` when either endpoint is outside the grid or
    /// unwalkable, or when the goal is not reachable from the start.
    pub fn search(&self, start: Point, goal: Point) -> Option<SearchOutcome> {
        let grid = &*self.grid;
        let start_idx = grid.index(start)?;
        let goal_idx = grid.index(goal)?;

        if !grid.cell_at(start_idx).walkable || !grid.cell_at(goal_idx).walkable {
            log::trace!("search {start} -> {goal}: endpoint unwalkable");
            return None;
        }
        if start_idx == goal_idx {
            return Some(SearchOutcome {
                cells: vec![start],
                cost: 0,
                expanded: 0,
            });
        }

        let mut nodes = vec![SearchNode::default(); grid.len()];
        let mut closed = vec![false; grid.len()];
        let mut open: Heap<OpenEntry> = Heap::with_capacity(grid.len());

        nodes[start_idx] = SearchNode {
            g: 0,
            h: octile(start, goal),
            parent: NO_PARENT,
        };
        open.add(OpenEntry::of(start_idx, &nodes[start_idx]));

        let mut nbuf = Vec::with_capacity(8);
        let mut expanded = 0;

        let found = 'search: loop {
            let Some(current) = open.remove_first() else {
                break 'search false;
            };
            let ci = current.idx;
            closed[ci] = true;
            if ci == goal_idx {
                break 'search true;
            }
            expanded += 1;

            let current_pos = grid.point(ci);
            let current_g = nodes[ci].g;

            nbuf.clear();
            grid.neighbors(ci, &mut nbuf);

            for &ni in nbuf.iter() {
                let cell = grid.cell_at(ni);
                if !cell.walkable || closed[ni] {
                    continue;
                }
                let tentative_g = current_g + octile(current_pos, cell.pos) + cell.penalty;
                let queued = OpenEntry::of(ni, &nodes[ni]);
                let in_open = open.contains(&queued);
                if in_open && tentative_g >= nodes[ni].g {
                    continue;
                }

                let n = &mut nodes[ni];
                n.g = tentative_g;
                n.h = octile(cell.pos, goal);
                n.parent = ci;
                let entry = OpenEntry::of(ni, n);
                if in_open {
                    open.update_item(entry);
                } else {
                    open.add(entry);
                }
            }
        };

        if !found {
            log::trace!("search {start} -> {goal}: unreachable after {expanded} expansions");
            return None;
        }

        let mut cells = Vec::new();
        let mut ci = goal_idx;
        while ci != NO_PARENT {
            cells.push(grid.point(ci));
            ci = nodes[ci].parent;
        }
        cells.reverse();

        log::trace!(
            "search {start} -> {goal}: {} cells, cost {}, {expanded} expansions",
            cells.len(),
            nodes[goal_idx].g
        );
        Some(SearchOutcome {
            cells,
            cost: nodes[goal_idx].g,
            expanded,
        })
    }
}

/// Corner cells of a raw path, without the origin cell.
fn route_waypoints(cells: &[Point]) -> Vec<Point> {
    let mut corners = simplify_path(cells);
    if corners.len() > 1 {
        corners.remove(0);
    }
    corners
}
