use std::cmp::Ordering;

use tilenav_core::{Point, Vec2};

use crate::heap::HeapItem;

/// One grid unit. Immutable once the grid is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub walkable: bool,
    /// Additive traversal cost, always `>= 0`.
    pub penalty: i32,
    /// World-space centre of the cell.
    pub world: Vec2,
    /// Grid coordinate.
    pub pos: Point,
}

/// Parent sentinel for the start cell (and unvisited cells).
pub(crate) const NO_PARENT: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Per-search scratch state
// ---------------------------------------------------------------------------

/// A* bookkeeping for one cell during one search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchNode {
    pub(crate) g: i32,
    pub(crate) h: i32,
    pub(crate) parent: usize,
}

impl SearchNode {
    #[inline]
    pub(crate) fn f(&self) -> i32 {
        self.g + self.h
    }
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g: i32::MAX,
            h: 0,
            parent: NO_PARENT,
        }
    }
}

/// Open-set entry: a cell index with the costs it was queued under.
///
/// Ordered by ascending `f`, ties broken by ascending `h` so the cell
/// estimated closer to the goal is expanded first. The index is the final
/// tie-break, which keeps searches deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenEntry {
    pub(crate) idx: usize,
    pub(crate) f: i32,
    pub(crate) h: i32,
}

impl OpenEntry {
    #[inline]
    pub(crate) fn of(idx: usize, node: &SearchNode) -> Self {
        Self {
            idx,
            f: node.f(),
            h: node.h,
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .cmp(&other.f)
            .then(self.h.cmp(&other.h))
            .then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HeapItem for OpenEntry {
    #[inline]
    fn heap_id(&self) -> usize {
        self.idx
    }
}
