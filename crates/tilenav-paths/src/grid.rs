//! The navigation grid: a cost field sampled once from the world.
//!
//! Building a [`NavGrid`] samples every cell centre against a
//! [`WorldQuery`], assigns terrain penalties, charges unwalkable cells the
//! obstacle-proximity penalty and smooths the whole penalty field with a
//! separable box blur. After that the grid is immutable and can be shared
//! between any number of concurrent searches behind an `Arc`.

use tilenav_core::{Point, Range, Vec2};

use crate::config::GridConfig;
use crate::error::NavError;
use crate::node::Cell;
use crate::traits::WorldQuery;

/// A fixed-shape grid of [`Cell`]s over a world rectangle.
#[derive(Debug, Clone)]
pub struct NavGrid {
    cells: Vec<Cell>,
    bounds: Range,
    width: usize,
    config: GridConfig,
    bottom_left: Vec2,
    penalty_min: i32,
    penalty_max: i32,
}

impl NavGrid {
    /// Sample `world` and build the cost field described by `config`.
    pub fn build<W: WorldQuery + ?Sized>(config: &GridConfig, world: &W) -> Result<Self, NavError> {
        config.validate()?;
        let (w, h) = config.grid_size();
        let bounds = Range::new(0, 0, w, h);
        let radius = config.cell_radius;
        let diameter = config.cell_diameter();
        let bottom_left = config.center - config.world_size * 0.5;

        let mut cells = Vec::with_capacity(bounds.len());
        for pos in bounds.iter() {
            let world_pos = bottom_left
                + Vec2::new(
                    pos.x as f32 * diameter + radius,
                    pos.y as f32 * diameter + radius,
                );
            let terrain = world.terrain_at(world_pos);
            let walkable = terrain.is_some() && !world.is_obstructed(world_pos, radius);
            let mut penalty = terrain.map_or(0, |t| config.penalty_for(t));
            if !walkable {
                penalty += config.obstacle_proximity_penalty;
            }
            cells.push(Cell {
                walkable,
                penalty,
                world: world_pos,
                pos,
            });
        }

        let mut grid = Self {
            cells,
            bounds,
            width: w as usize,
            config: config.clone(),
            bottom_left,
            penalty_min: 0,
            penalty_max: 0,
        };
        if config.blur_radius > 0 {
            grid.blur_penalties(config.blur_radius);
        }
        grid.penalty_min = grid.cells.iter().map(|c| c.penalty).min().unwrap_or(0);
        grid.penalty_max = grid.cells.iter().map(|c| c.penalty).max().unwrap_or(0);

        log::debug!(
            "built {w}x{h} nav grid: {} walkable cells, penalties {}..={}",
            grid.cells.iter().filter(|c| c.walkable).count(),
            grid.penalty_min,
            grid.penalty_max,
        );
        Ok(grid)
    }

    // -----------------------------------------------------------------------
    // Shape
    // -----------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Number of cells; also the largest open set a search can hold.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// The configuration the grid was built from.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Smallest and largest penalty after blurring (for visualisation).
    pub fn penalty_range(&self) -> (i32, i32) {
        (self.penalty_min, self.penalty_max)
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// Flat index of a grid coordinate, `None` outside the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width + p.x as usize)
    }

    /// Grid coordinate of a flat index.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        Point::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    pub fn cell(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// # Panics
    ///
    /// If `idx >= self.len()`.
    #[inline]
    pub fn cell_at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Append the indices of the up to 8 cells adjacent to `idx` into
    /// `buf`. The caller clears `buf` before calling.
    pub fn neighbors(&self, idx: usize, buf: &mut Vec<usize>) {
        let p = self.point(idx);
        for n in p.neighbors_8() {
            if let Some(ni) = self.index(n) {
                buf.push(ni);
            }
        }
    }

    // -----------------------------------------------------------------------
    // World <-> grid
    // -----------------------------------------------------------------------

    /// The cell nearest to a world position. Points outside the world
    /// rectangle snap to the border cell.
    pub fn cell_from_world(&self, world: Vec2) -> Point {
        let size = self.config.world_size;
        let rel = world - self.config.center;
        let px = ((rel.x + size.x * 0.5) / size.x).clamp(0.0, 1.0);
        let py = ((rel.y + size.y * 0.5) / size.y).clamp(0.0, 1.0);
        let x = ((self.width() - 1) as f32 * px).round() as i32;
        let y = ((self.height() - 1) as f32 * py).round() as i32;
        self.bounds.clamp(Point::new(x, y))
    }

    /// World-space centre of a grid coordinate (which may lie outside).
    pub fn world_from_cell(&self, p: Point) -> Vec2 {
        let r = self.config.cell_radius;
        let d = self.config.cell_diameter();
        self.bottom_left + Vec2::new(p.x as f32 * d + r, p.y as f32 * d + r)
    }

    // -----------------------------------------------------------------------
    // Blur
    // -----------------------------------------------------------------------

    /// Box-blur the penalty field with a `(2·radius+1)²` kernel, clamping
    /// samples at the edges: one horizontal pass, one vertical pass.
    fn blur_penalties(&mut self, radius: usize) {
        let w = self.width;
        let h = self.cells.len() / w;
        let kernel = (2 * radius + 1) as f64;

        let mut horizontal = vec![0i64; w * h];
        let mut line = Vec::with_capacity(w.max(h));
        let mut sums = vec![0i64; w.max(h)];
        for y in 0..h {
            line.clear();
            line.extend(self.cells[y * w..(y + 1) * w].iter().map(|c| i64::from(c.penalty)));
            sliding_sum(&line, radius, &mut sums[..w]);
            horizontal[y * w..(y + 1) * w].copy_from_slice(&sums[..w]);
        }

        for x in 0..w {
            line.clear();
            line.extend((0..h).map(|y| horizontal[y * w + x]));
            sliding_sum(&line, radius, &mut sums[..h]);
            for (y, &sum) in sums[..h].iter().enumerate() {
                self.cells[y * w + x].penalty = (sum as f64 / (kernel * kernel)).round() as i32;
            }
        }
    }
}

/// Windowed sums `out[i] = Σ values[clamp(i + k)]` for `k ∈ [-ext, ext]`,
/// computed incrementally.
fn sliding_sum(values: &[i64], ext: usize, out: &mut [i64]) {
    debug_assert_eq!(values.len(), out.len());
    let Some(last) = values.len().checked_sub(1) else {
        return;
    };
    let clamped = |i: isize| values[i.clamp(0, last as isize) as usize];
    let ext = ext as isize;

    let mut sum: i64 = (-ext..=ext).map(clamped).sum();
    out[0] = sum;
    for i in 1..values.len() as isize {
        sum += clamped(i + ext) - clamped(i - ext - 1);
        out[i as usize] = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PENALTY;
    use crate::tiles::{GROUND, MUD, ROAD, TileLayer, TileLegend};
    use crate::traits::TerrainId;

    fn build(rows: &[&str], base: GridConfig) -> NavGrid {
        let layer = TileLayer::parse(rows, &TileLegend::default(), 1.0, Vec2::ZERO).unwrap();
        NavGrid::build(&layer.grid_config(base), &layer).unwrap()
    }

    fn no_blur() -> GridConfig {
        GridConfig::default().with_blur_radius(0)
    }

    #[test]
    fn shape_and_indexing() {
        let g = build(&["....", "....", "...."], no_blur());
        assert_eq!((g.width(), g.height()), (4, 3));
        assert_eq!(g.len(), 12);
        for (i, cell) in g.cells().iter().enumerate() {
            assert_eq!(g.index(cell.pos), Some(i));
            assert_eq!(g.point(i), cell.pos);
        }
        assert_eq!(g.index(Point::new(4, 0)), None);
        assert_eq!(g.index(Point::new(-1, 0)), None);
    }

    #[test]
    fn walls_and_missing_tiles_are_unwalkable() {
        let g = build(&[".# ."], no_blur().with_obstacle_proximity_penalty(25));
        let walkable: Vec<bool> = g.cells().iter().map(|c| c.walkable).collect();
        assert_eq!(walkable, vec![true, false, false, true]);
        let penalties: Vec<i32> = g.cells().iter().map(|c| c.penalty).collect();
        assert_eq!(penalties, vec![0, 25, 25, 0]);
    }

    #[test]
    fn terrain_penalties_apply() {
        let config = no_blur()
            .with_terrain_penalty(MUD, 40)
            .with_terrain_penalty(ROAD, 0)
            .with_terrain_penalty(TerrainId(99), 1000);
        let g = build(&[".~="], config);
        let penalties: Vec<i32> = g.cells().iter().map(|c| c.penalty).collect();
        assert_eq!(penalties, vec![0, 40, 0]);
        assert!(g.cells().iter().all(|c| c.walkable));
    }

    #[test]
    fn blur_keeps_uniform_field() {
        let config = GridConfig::default()
            .with_blur_radius(2)
            .with_terrain_penalty(MUD, 7);
        let g = build(&["~~~~~", "~~~~~", "~~~~~"], config);
        assert!(g.cells().iter().all(|c| c.penalty == 7));
        assert_eq!(g.penalty_range(), (7, 7));
    }

    #[test]
    fn blur_bleeds_obstacle_penalty_into_neighbors() {
        let config = GridConfig::default()
            .with_blur_radius(1)
            .with_obstacle_proximity_penalty(90);
        let g = build(&[".....", ".....", "..#..", ".....", "....."], config);
        let at = |x, y| g.cell(Point::new(x, y)).unwrap().penalty;
        assert_eq!(at(2, 2), 10);
        assert_eq!(at(1, 1), 10);
        assert_eq!(at(3, 2), 10);
        assert_eq!(at(0, 0), 0);
        assert_eq!(at(4, 2), 0);
        assert_eq!(g.penalty_range(), (0, 10));
        // Walkability is untouched by the blur.
        assert!(!g.cell(Point::new(2, 2)).unwrap().walkable);
    }

    #[test]
    fn blur_clamps_at_edges() {
        let config = GridConfig::default()
            .with_blur_radius(1)
            .with_obstacle_proximity_penalty(90);
        let g = build(&["#..", "...", "..."], config);
        let at = |x, y| g.cell(Point::new(x, y)).unwrap().penalty;
        // Corner samples itself four times in the 3x3 window.
        assert_eq!(at(0, 0), 40);
        assert_eq!(at(1, 0), 20);
        assert_eq!(at(1, 1), 10);
        assert_eq!(at(2, 2), 0);
    }

    #[test]
    fn sliding_sum_matches_naive() {
        let values: Vec<i64> = vec![5, 0, 3, 9, 1, 1, 8];
        for ext in 0..4usize {
            let mut out = vec![0; values.len()];
            sliding_sum(&values, ext, &mut out);
            for (i, &got) in out.iter().enumerate() {
                let naive: i64 = (-(ext as isize)..=ext as isize)
                    .map(|k| {
                        let j = (i as isize + k).clamp(0, values.len() as isize - 1);
                        values[j as usize]
                    })
                    .sum();
                assert_eq!(got, naive, "ext={ext} i={i}");
            }
        }
    }

    #[test]
    fn neighbors_are_clipped() {
        let g = build(&["....", "....", "...."], no_blur());
        let mut buf = Vec::new();
        let mut count = |p: Point| {
            buf.clear();
            g.neighbors(g.index(p).unwrap(), &mut buf);
            buf.len()
        };
        assert_eq!(count(Point::new(0, 0)), 3);
        assert_eq!(count(Point::new(1, 0)), 5);
        assert_eq!(count(Point::new(1, 1)), 8);
        assert_eq!(count(Point::new(3, 2)), 3);
    }

    #[test]
    fn world_mapping_snaps_and_clamps() {
        let g = build(&["....", "....", "...."], no_blur());
        // The layer spans (0,0)-(4,3); cell (x,y) is centred at (x+.5, y+.5).
        assert_eq!(g.world_from_cell(Point::new(2, 1)), Vec2::new(2.5, 1.5));
        for cell in g.cells() {
            assert_eq!(g.cell_from_world(cell.world), cell.pos);
        }
        assert_eq!(g.cell_from_world(Vec2::new(-50.0, -50.0)), Point::new(0, 0));
        assert_eq!(g.cell_from_world(Vec2::new(50.0, 1.5)), Point::new(3, 1));
        assert_eq!(g.cell_from_world(Vec2::new(2.5, 99.0)), Point::new(2, 2));
    }

    #[test]
    fn invalid_config_is_reported() {
        let layer = TileLayer::parse(&["..."], &TileLegend::default(), 1.0, Vec2::ZERO).unwrap();
        let config = GridConfig::default().with_cell_radius(-1.0);
        assert!(matches!(
            NavGrid::build(&config, &layer),
            Err(NavError::InvalidConfig(_))
        ));
    }

    #[test]
    fn refuses_grids_whose_costs_could_overflow() {
        let rows = vec![".".repeat(50); 50];
        let layer = TileLayer::parse(&rows, &TileLegend::default(), 1.0, Vec2::ZERO).unwrap();
        let config = layer.grid_config(
            GridConfig::default()
                .with_terrain_penalty(GROUND, MAX_PENALTY)
                .with_obstacle_proximity_penalty(MAX_PENALTY),
        );
        assert!(matches!(
            NavGrid::build(&config, &layer),
            Err(NavError::InvalidConfig(_))
        ));
    }
}
