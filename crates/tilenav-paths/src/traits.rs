use tilenav_core::Vec2;

/// Identifier of a terrain category carried by tile metadata
/// (grass, road, mud, ...). Penalties are looked up per category in
/// [`GridConfig`](crate::GridConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainId(pub u16);

/// The tile/collision layer the grid is sampled from.
///
/// Implementations must be `Sync` so a grid can be built off the main
/// thread; the grid only calls these during [`NavGrid::build`](crate::NavGrid::build).
pub trait WorldQuery: Sync {
    /// Whether any non-walkable collider overlaps the square of half-size
    /// `radius` centred on `center`.
    fn is_obstructed(&self, center: Vec2, radius: f32) -> bool;

    /// Terrain category of the tile under `point`, or `None` when there is
    /// no tile there. Cells without a tile are never walkable.
    fn terrain_at(&self, point: Vec2) -> Option<TerrainId>;
}
