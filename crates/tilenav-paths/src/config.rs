//! Configuration for grid construction, corridors and the dispatcher.
//!
//! Every struct has sensible defaults and `with_*` builders. With the
//! `serde` feature the whole set can be loaded from JSON through
//! [`NavConfig::from_json`]; missing fields fall back to their defaults.
//!
//! ```
//! use tilenav_core::Vec2;
//! use tilenav_paths::{GridConfig, TerrainId};
//!
//! let config = GridConfig::default()
//!     .with_world_size(Vec2::new(20.0, 10.0))
//!     .with_cell_radius(0.5)
//!     .with_terrain_penalty(TerrainId(2), 30)
//!     .with_blur_radius(1);
//! assert_eq!(config.grid_size(), (20, 10));
//! assert!(config.validate().is_ok());
//! ```

use tilenav_core::Vec2;

use crate::distance::DIAGONAL_COST;
use crate::error::NavError;
use crate::traits::TerrainId;

/// Largest accepted terrain or obstacle penalty.
pub const MAX_PENALTY: i32 = 1_000_000;

/// Penalty applied to every cell whose tile carries `terrain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainPenalty {
    pub terrain: TerrainId,
    pub penalty: i32,
}

// ---------------------------------------------------------------------------
// GridConfig
// ---------------------------------------------------------------------------

/// Parameters for [`NavGrid::build`](crate::NavGrid::build).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Extent of the mapped world rectangle.
    pub world_size: Vec2,
    /// World-space centre of the rectangle.
    pub center: Vec2,
    /// Half the side length of one cell.
    pub cell_radius: f32,
    /// Terrain category → movement penalty. Categories not listed cost 0.
    pub terrain_penalties: Vec<TerrainPenalty>,
    /// Box blur half-width in cells; 0 disables smoothing.
    pub blur_radius: usize,
    /// Carried by every unwalkable cell before smoothing; the blur bleeds it
    /// into walkable neighbours so routes keep away from walls.
    pub obstacle_proximity_penalty: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            world_size: Vec2::new(30.0, 30.0),
            center: Vec2::ZERO,
            cell_radius: 0.5,
            terrain_penalties: Vec::new(),
            blur_radius: 3,
            obstacle_proximity_penalty: 10,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn with_world_size(mut self, size: Vec2) -> Self {
        self.world_size = size;
        self
    }

    #[must_use]
    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    #[must_use]
    pub fn with_cell_radius(mut self, radius: f32) -> Self {
        self.cell_radius = radius;
        self
    }

    /// Set (or replace) the penalty for one terrain category.
    #[must_use]
    pub fn with_terrain_penalty(mut self, terrain: TerrainId, penalty: i32) -> Self {
        match self
            .terrain_penalties
            .iter_mut()
            .find(|tp| tp.terrain == terrain)
        {
            Some(tp) => tp.penalty = penalty,
            None => self
                .terrain_penalties
                .push(TerrainPenalty { terrain, penalty }),
        }
        self
    }

    #[must_use]
    pub fn with_blur_radius(mut self, radius: usize) -> Self {
        self.blur_radius = radius;
        self
    }

    #[must_use]
    pub fn with_obstacle_proximity_penalty(mut self, penalty: i32) -> Self {
        self.obstacle_proximity_penalty = penalty;
        self
    }

    /// Side length of one cell.
    #[inline]
    pub fn cell_diameter(&self) -> f32 {
        self.cell_radius * 2.0
    }

    /// Number of cells along each axis: `round(world_size / diameter)`.
    pub fn grid_size(&self) -> (i32, i32) {
        let d = self.cell_diameter();
        (
            (self.world_size.x / d).round() as i32,
            (self.world_size.y / d).round() as i32,
        )
    }

    /// Penalty for a terrain category; unlisted categories cost nothing.
    pub fn penalty_for(&self, terrain: TerrainId) -> i32 {
        self.terrain_penalties
            .iter()
            .find(|tp| tp.terrain == terrain)
            .map_or(0, |tp| tp.penalty)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), NavError> {
        if !(self.cell_radius.is_finite() && self.cell_radius > 0.0) {
            return Err(NavError::invalid_config(format!(
                "cell_radius must be positive, got {}",
                self.cell_radius
            )));
        }
        if !(self.world_size.x.is_finite() && self.world_size.y.is_finite()) {
            return Err(NavError::invalid_config("world_size must be finite"));
        }
        let (w, h) = self.grid_size();
        if w < 1 || h < 1 {
            return Err(NavError::invalid_config(format!(
                "world {} with cell radius {} yields a {w}x{h} grid",
                self.world_size, self.cell_radius
            )));
        }
        if let Some(tp) = self
            .terrain_penalties
            .iter()
            .find(|tp| !(0..=MAX_PENALTY).contains(&tp.penalty))
        {
            return Err(NavError::invalid_config(format!(
                "penalty for terrain {} must be in 0..={MAX_PENALTY}, got {}",
                tp.terrain.0, tp.penalty
            )));
        }
        if !(0..=MAX_PENALTY).contains(&self.obstacle_proximity_penalty) {
            return Err(NavError::invalid_config(format!(
                "obstacle_proximity_penalty must be in 0..={MAX_PENALTY}, got {}",
                self.obstacle_proximity_penalty
            )));
        }
        if self.worst_case_cost() > i64::from(i32::MAX) {
            return Err(NavError::invalid_config(format!(
                "path costs on a {w}x{h} grid with these penalties do not fit in i32"
            )));
        }
        Ok(())
    }

    /// Upper bound on any F cost a search over this grid can produce: every
    /// cell visited once at the highest possible penalty, plus the largest
    /// heuristic.
    fn worst_case_cost(&self) -> i64 {
        let (w, h) = self.grid_size();
        let (w, h) = (i64::from(w), i64::from(h));
        let terrain_max = self
            .terrain_penalties
            .iter()
            .map(|tp| i64::from(tp.penalty))
            .max()
            .unwrap_or(0);
        let cell_max = terrain_max + i64::from(self.obstacle_proximity_penalty);
        let diagonal = i64::from(DIAGONAL_COST);
        w * h * (diagonal + cell_max) + diagonal * (w + h)
    }
}

// ---------------------------------------------------------------------------
// CorridorConfig
// ---------------------------------------------------------------------------

/// Steering parameters used when turning waypoints into a
/// [`PathCorridor`](crate::PathCorridor).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorridorConfig {
    /// How far before each waypoint the turn boundary sits.
    pub turn_distance: f32,
    /// Distance from the goal at which followers start to decelerate.
    pub stopping_distance: f32,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            turn_distance: 1.0,
            stopping_distance: 2.0,
        }
    }
}

impl CorridorConfig {
    #[must_use]
    pub fn with_turn_distance(mut self, distance: f32) -> Self {
        self.turn_distance = distance;
        self
    }

    #[must_use]
    pub fn with_stopping_distance(mut self, distance: f32) -> Self {
        self.stopping_distance = distance;
        self
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if !(self.turn_distance.is_finite() && self.turn_distance >= 0.0) {
            return Err(NavError::invalid_config(
                "turn_distance must be a non-negative number",
            ));
        }
        if !(self.stopping_distance.is_finite() && self.stopping_distance >= 0.0) {
            return Err(NavError::invalid_config(
                "stopping_distance must be a non-negative number",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DispatcherConfig
// ---------------------------------------------------------------------------

/// Worker pool settings for [`PathDispatcher`](crate::PathDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatcherConfig {
    /// Maximum number of searches running at once.
    pub workers: usize,
    /// Prefix for worker thread names.
    pub thread_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .clamp(1, 8);
        Self {
            workers,
            thread_name: "tilenav-path".to_string(),
        }
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if self.workers == 0 {
            return Err(NavError::invalid_config(
                "dispatcher needs at least one worker",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NavConfig
// ---------------------------------------------------------------------------

/// All navigation settings in one place.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    pub grid: GridConfig,
    pub corridor: CorridorConfig,
    pub dispatcher: DispatcherConfig,
}

impl NavConfig {
    pub fn validate(&self) -> Result<(), NavError> {
        self.grid.validate()?;
        self.corridor.validate()?;
        self.dispatcher.validate()
    }

    /// Parse and validate a JSON configuration.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let config: NavConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("loaded navigation config: {config:?}");
        Ok(config)
    }
}
