use tilenav_core::Point;

/// Reduce a cell path to its endpoints and the cells where its direction
/// changes.
///
/// The first and last cells are always kept. An interior cell is kept when
/// its outgoing step direction differs from its incoming one. Directions
/// are compared by component sign, so consecutive kept cells never lie on
/// one straight run and simplifying the output again returns it unchanged.
pub fn simplify_path(cells: &[Point]) -> Vec<Point> {
    let (Some(&first), Some(&last)) = (cells.first(), cells.last()) else {
        return Vec::new();
    };
    if cells.len() < 2 {
        return vec![first];
    }
    let mut waypoints = vec![first];
    for w in cells.windows(3) {
        if (w[1] - w[0]).signum() != (w[2] - w[1]).signum() {
            waypoints.push(w[1]);
        }
    }
    waypoints.push(last);
    waypoints
}
