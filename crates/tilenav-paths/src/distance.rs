use tilenav_core::Point;

/// Cost of an axis-aligned step.
pub const STRAIGHT_COST: i32 = 10;

/// Cost of a diagonal step (≈ √2 · [`STRAIGHT_COST`]).
pub const DIAGONAL_COST: i32 = 14;

/// Octile distance between two cells in step-cost units.
///
/// Exact for an unobstructed, zero-penalty grid with 8-way moves, so it never
/// overestimates and is an admissible A* heuristic.
#[inline]
pub fn octile(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * short + STRAIGHT_COST * (long - short)
}
