//! Cost-weighted grid pathfinding for tile worlds.
//!
//! The pieces, from the bottom up:
//!
//! - [`NavGrid`]: a cost field sampled once from a [`WorldQuery`] (terrain
//!   penalties, obstacle proximity, box-blurred) and shared read-only
//!   behind an `Arc`.
//! - [`Pathfinder`]: 8-way A* over the grid, with octile costs plus cell
//!   penalties, returning corner waypoints ([`simplify_path`]).
//! - [`PathCorridor`] / [`CorridorCursor`]: turn boundaries and goal
//!   deceleration for agents following those waypoints.
//! - [`PathDispatcher`]: a worker pool that accepts requests from any thread
//!   and delivers results on the owner's [`tick`](PathDispatcher::tick).
//!
//! [`Heap`] is the index-tracking binary heap used for the open set and is
//! usable on its own.
//!
//! ```
//! use std::sync::Arc;
//! use tilenav_core::Vec2;
//! use tilenav_paths::{GridConfig, NavGrid, Pathfinder, TileLayer, TileLegend};
//!
//! let layer = TileLayer::parse(
//!     &["....", ".##.", "...."],
//!     &TileLegend::default(),
//!     1.0,
//!     Vec2::ZERO,
//! )
//! .unwrap();
//! let grid = NavGrid::build(&layer.grid_config(GridConfig::default()), &layer).unwrap();
//! let result = Pathfinder::new(Arc::new(grid)).find_path(Vec2::new(0.5, 1.5), Vec2::new(3.5, 1.5));
//! assert!(result.success);
//! assert_eq!(result.waypoints.last(), Some(&Vec2::new(3.5, 1.5)));
//! ```

mod astar;
mod config;
mod corridor;
mod dispatcher;
mod distance;
mod error;
mod grid;
mod heap;
mod node;
mod simplify;
mod tiles;
mod traits;

pub use astar::{PathResult, Pathfinder, SearchOutcome};
pub use config::{
    CorridorConfig, DispatcherConfig, GridConfig, MAX_PENALTY, NavConfig, TerrainPenalty,
};
pub use corridor::{CorridorCursor, PathCorridor, STOP_SPEED_THRESHOLD, Steering, TurnBoundary};
pub use dispatcher::{PathDispatcher, RequestId};
pub use distance::{DIAGONAL_COST, STRAIGHT_COST, octile};
pub use error::NavError;
pub use grid::NavGrid;
pub use heap::{Heap, HeapItem};
pub use node::Cell;
pub use simplify::simplify_path;
pub use tiles::{GROUND, MUD, ROAD, TileKind, TileLayer, TileLegend};
pub use traits::{TerrainId, WorldQuery};
