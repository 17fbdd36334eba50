//! **tilenav-core**: geometry primitives shared by the *tilenav* crates.
//!
//! Grid-space positions are integer [`Point`]s inside half-open [`Range`]s;
//! world-space positions are floating-point [`Vec2`]s. The pathfinding crate
//! maps between the two.

pub mod geom;
pub mod vec2;

pub use geom::{Point, Range, RangeIter};
pub use vec2::Vec2;
