//! An in-memory tile layer built from character rows.
//!
//! [`TileLayer`] is a small [`WorldQuery`] implementation for tools, tests
//! and demos: each character is one square tile, and a [`TileLegend`] says
//! what it stands for. The first row is `y = 0` and world-space `y` grows
//! with the row index.
//!
//! ```
//! use tilenav_core::Vec2;
//! use tilenav_paths::{TileLayer, TileLegend, WorldQuery};
//!
//! let layer = TileLayer::parse(&["..#", ".~."], &TileLegend::default(), 1.0, Vec2::ZERO).unwrap();
//! assert_eq!(layer.size(), (3, 2));
//! assert!(layer.is_obstructed(Vec2::new(2.5, 0.5), 0.5));
//! assert!(!layer.is_obstructed(Vec2::new(0.5, 0.5), 0.5));
//! ```

use tilenav_core::{Point, Range, Vec2};

use crate::config::GridConfig;
use crate::error::NavError;
use crate::traits::{TerrainId, WorldQuery};

/// Terrain of plain walkable ground in the default legend.
pub const GROUND: TerrainId = TerrainId(0);
/// Terrain of `~` tiles in the default legend.
pub const MUD: TerrainId = TerrainId(1);
/// Terrain of `=` tiles in the default legend.
pub const ROAD: TerrainId = TerrainId(2);

/// What a single tile is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// No tile at all; never walkable.
    Void,
    /// Walkable tile of the given terrain.
    Open(TerrainId),
    /// Tile covered by an unwalkable collider.
    Blocked(TerrainId),
}

/// Character → tile mapping used by [`TileLayer::parse`].
#[derive(Debug, Clone)]
pub struct TileLegend {
    entries: Vec<(char, TileKind)>,
}

impl Default for TileLegend {
    /// `.` ground, `~` mud, `=` road, `#` wall, space for no tile.
    fn default() -> Self {
        Self {
            entries: vec![
                ('.', TileKind::Open(GROUND)),
                ('~', TileKind::Open(MUD)),
                ('=', TileKind::Open(ROAD)),
                ('#', TileKind::Blocked(GROUND)),
                (' ', TileKind::Void),
            ],
        }
    }
}

impl TileLegend {
    /// An empty legend.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Map `ch` to `kind`, replacing any earlier mapping.
    #[must_use]
    pub fn with(mut self, ch: char, kind: TileKind) -> Self {
        self.entries.retain(|(c, _)| *c != ch);
        self.entries.push((ch, kind));
        self
    }

    pub fn get(&self, ch: char) -> Option<TileKind> {
        self.entries
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, kind)| *kind)
    }
}

/// A rectangular layer of square tiles.
#[derive(Debug, Clone)]
pub struct TileLayer {
    tiles: Vec<TileKind>,
    bounds: Range,
    tile_size: f32,
    /// World position of the corner of tile (0, 0).
    origin: Vec2,
}

impl TileLayer {
    /// Parse equally long character rows into a layer whose tile (0, 0)
    /// starts at `origin`.
    pub fn parse<S: AsRef<str>>(
        rows: &[S],
        legend: &TileLegend,
        tile_size: f32,
        origin: Vec2,
    ) -> Result<Self, NavError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(NavError::tile_layer(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(NavError::tile_layer("no tiles"));
        }
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != width {
                return Err(NavError::tile_layer(format!(
                    "row {y} has {len} columns, expected {width}"
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                let kind = legend.get(ch).ok_or_else(|| {
                    NavError::tile_layer(format!("unknown tile {ch:?} at ({x}, {y})"))
                })?;
                tiles.push(kind);
            }
        }
        Ok(Self {
            tiles,
            bounds: Range::new(0, 0, width as i32, rows.len() as i32),
            tile_size,
            origin,
        })
    }

    /// Width and height in tiles.
    pub fn size(&self) -> (i32, i32) {
        (self.bounds.width(), self.bounds.height())
    }

    /// World-space extent of the layer.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.bounds.width() as f32 * self.tile_size,
            self.bounds.height() as f32 * self.tile_size,
        )
    }

    /// World-space centre of the layer.
    pub fn center(&self) -> Vec2 {
        self.origin + self.world_size() * 0.5
    }

    /// A grid configuration covering exactly this layer with one cell per
    /// tile; other settings come from `base`.
    pub fn grid_config(&self, base: GridConfig) -> GridConfig {
        base.with_world_size(self.world_size())
            .with_center(self.center())
            .with_cell_radius(self.tile_size * 0.5)
    }

    /// The tile at a tile coordinate.
    pub fn tile(&self, p: Point) -> Option<TileKind> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(self.tiles[(p.y * self.bounds.width() + p.x) as usize])
    }

    fn tile_coord(&self, v: f32, origin: f32) -> i32 {
        ((v - origin) / self.tile_size).floor() as i32
    }
}

impl WorldQuery for TileLayer {
    fn is_obstructed(&self, center: Vec2, radius: f32) -> bool {
        // Shrink slightly so squares that only touch a blocked tile's edge
        // do not count as overlapping it.
        const EDGE: f32 = 1e-4;
        let r = (radius - EDGE).max(0.0);
        let x0 = self.tile_coord(center.x - r, self.origin.x);
        let x1 = self.tile_coord(center.x + r, self.origin.x);
        let y0 = self.tile_coord(center.y - r, self.origin.y);
        let y1 = self.tile_coord(center.y + r, self.origin.y);
        (y0..=y1).any(|y| {
            (x0..=x1).any(|x| matches!(self.tile(Point::new(x, y)), Some(TileKind::Blocked(_))))
        })
    }

    fn terrain_at(&self, point: Vec2) -> Option<TerrainId> {
        let p = Point::new(
            self.tile_coord(point.x, self.origin.x),
            self.tile_coord(point.y, self.origin.y),
        );
        match self.tile(p)? {
            TileKind::Void => None,
            TileKind::Open(t) | TileKind::Blocked(t) => Some(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(rows: &[&str]) -> TileLayer {
        TileLayer::parse(rows, &TileLegend::default(), 1.0, Vec2::ZERO).unwrap()
    }

    #[test]
    fn parses_rows_bottom_up() {
        let l = layer(&["#..", "~= "]);
        assert_eq!(l.size(), (3, 2));
        assert_eq!(l.tile(Point::new(0, 0)), Some(TileKind::Blocked(GROUND)));
        assert_eq!(l.tile(Point::new(0, 1)), Some(TileKind::Open(MUD)));
        assert_eq!(l.tile(Point::new(2, 1)), Some(TileKind::Void));
        assert_eq!(l.tile(Point::new(3, 0)), None);
    }

    #[test]
    fn rejects_ragged_and_unknown() {
        let legend = TileLegend::default();
        let err = TileLayer::parse(&["...", ".."], &legend, 1.0, Vec2::ZERO).unwrap_err();
        assert!(err.to_string().contains("row 1 has 2 columns"));
        let err = TileLayer::parse(&[".x."], &legend, 1.0, Vec2::ZERO).unwrap_err();
        assert!(err.to_string().contains("unknown tile 'x'"));
        let empty: [&str; 0] = [];
        assert!(TileLayer::parse(&empty, &legend, 1.0, Vec2::ZERO).is_err());
        assert!(TileLayer::parse(&["."], &legend, 0.0, Vec2::ZERO).is_err());
    }

    #[test]
    fn terrain_lookup() {
        let l = layer(&[".~= #"]);
        assert_eq!(l.terrain_at(Vec2::new(0.5, 0.5)), Some(GROUND));
        assert_eq!(l.terrain_at(Vec2::new(1.5, 0.5)), Some(MUD));
        assert_eq!(l.terrain_at(Vec2::new(2.5, 0.5)), Some(ROAD));
        assert_eq!(l.terrain_at(Vec2::new(3.5, 0.5)), None);
        assert_eq!(l.terrain_at(Vec2::new(4.5, 0.5)), Some(GROUND));
        assert_eq!(l.terrain_at(Vec2::new(-0.5, 0.5)), None);
    }

    #[test]
    fn touching_edges_do_not_obstruct() {
        let l = layer(&[".#."]);
        assert!(!l.is_obstructed(Vec2::new(0.5, 0.5), 0.5));
        assert!(l.is_obstructed(Vec2::new(1.5, 0.5), 0.5));
        assert!(!l.is_obstructed(Vec2::new(2.5, 0.5), 0.5));
        // A wider radius reaches the wall.
        assert!(l.is_obstructed(Vec2::new(0.5, 0.5), 0.8));
    }

    #[test]
    fn custom_legend_and_offset_origin() {
        let legend = TileLegend::new()
            .with('o', TileKind::Open(TerrainId(7)))
            .with('x', TileKind::Blocked(TerrainId(7)));
        let l = TileLayer::parse(&["ox"], &legend, 2.0, Vec2::new(-2.0, -1.0)).unwrap();
        assert_eq!(l.world_size(), Vec2::new(4.0, 2.0));
        assert_eq!(l.center(), Vec2::new(0.0, 0.0));
        assert_eq!(l.terrain_at(Vec2::new(-1.0, 0.0)), Some(TerrainId(7)));
        assert!(l.is_obstructed(Vec2::new(1.0, 0.0), 1.0));
        let config = l.grid_config(GridConfig::default());
        assert_eq!(config.grid_size(), (2, 1));
    }
}
