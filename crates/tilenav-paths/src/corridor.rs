//! Turning waypoints into something an agent can steer along.
//!
//! A [`PathCorridor`] places a [`TurnBoundary`] shortly before every
//! waypoint. A follower heads for waypoint `i` until it crosses boundary
//! `i`, then switches to `i + 1`, which rounds off corners instead of
//! forcing the agent through every cell centre. Near the goal the corridor
//! reports a speed factor so followers can decelerate smoothly.

use tilenav_core::Vec2;

use crate::config::CorridorConfig;

/// Speed factor below which a decelerating follower stops.
pub const STOP_SPEED_THRESHOLD: f32 = 0.01;

/// A line across the path, perpendicular to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnBoundary {
    point: Vec2,
    /// Unit travel direction; the line's normal.
    direction: Vec2,
    approach_side: bool,
}

impl TurnBoundary {
    /// A boundary through `point`, with `approach` a position on the side
    /// followers come from.
    pub fn new(point: Vec2, direction: Vec2, approach: Vec2) -> Self {
        let direction = direction.normalized();
        let mut boundary = Self {
            point,
            direction,
            approach_side: false,
        };
        boundary.approach_side = boundary.side(approach);
        boundary
    }

    /// A point on the line.
    pub fn point(&self) -> Vec2 {
        self.point
    }

    /// The direction of travel the line was built for.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    fn side(&self, p: Vec2) -> bool {
        (p - self.point).dot(self.direction) > 0.0
    }

    /// Whether `p` lies on the far side from where followers approach.
    ///
    /// A boundary without a direction (zero-length segment) counts as
    /// crossed from anywhere.
    pub fn has_crossed(&self, p: Vec2) -> bool {
        self.direction == Vec2::ZERO || self.side(p) != self.approach_side
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_from_point(&self, p: Vec2) -> f32 {
        if self.direction == Vec2::ZERO {
            return p.distance(self.point);
        }
        (p - self.point).dot(self.direction).abs()
    }
}

/// Waypoints plus the turn boundaries and deceleration data for following
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCorridor {
    look_points: Vec<Vec2>,
    boundaries: Vec<TurnBoundary>,
    slow_down_index: usize,
    stopping_distance: f32,
}

impl PathCorridor {
    /// Build a corridor for a follower currently at `start_pos`.
    ///
    /// Boundary `i` sits `turn_distance` before waypoint `i` along the
    /// incoming direction, except the last one which lies on the goal.
    pub fn new(
        waypoints: &[Vec2],
        start_pos: Vec2,
        turn_distance: f32,
        stopping_distance: f32,
    ) -> Self {
        let finish = waypoints.len().saturating_sub(1);
        let mut boundaries = Vec::with_capacity(waypoints.len());
        let mut previous = start_pos;
        for (i, &current) in waypoints.iter().enumerate() {
            let dir = (current - previous).normalized();
            let boundary_point = if i == finish {
                current
            } else {
                current - dir * turn_distance
            };
            boundaries.push(TurnBoundary::new(
                boundary_point,
                dir,
                previous - dir * turn_distance,
            ));
            previous = boundary_point;
        }

        let mut slow_down_index = 0;
        let mut from_goal = 0.0;
        for i in (1..waypoints.len()).rev() {
            from_goal += waypoints[i].distance(waypoints[i - 1]);
            if from_goal > stopping_distance {
                slow_down_index = i;
                break;
            }
        }

        Self {
            look_points: waypoints.to_vec(),
            boundaries,
            slow_down_index,
            stopping_distance,
        }
    }

    /// [`PathCorridor::new`] with distances taken from `config`.
    pub fn from_config(waypoints: &[Vec2], start_pos: Vec2, config: &CorridorConfig) -> Self {
        Self::new(
            waypoints,
            start_pos,
            config.turn_distance,
            config.stopping_distance,
        )
    }

    pub fn look_points(&self) -> &[Vec2] {
        &self.look_points
    }

    pub fn boundaries(&self) -> &[TurnBoundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.look_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.look_points.is_empty()
    }

    /// Whether `point` is past boundary `i`.
    ///
    /// # Panics
    ///
    /// If `i >= self.len()`.
    pub fn has_crossed(&self, i: usize, point: Vec2) -> bool {
        self.boundaries[i].has_crossed(point)
    }

    /// Index of the last waypoint (0 for an empty corridor).
    pub fn finish_index(&self) -> usize {
        self.look_points.len().saturating_sub(1)
    }

    /// First waypoint index at which followers start to decelerate.
    pub fn slow_down_index(&self) -> usize {
        self.slow_down_index
    }

    /// Speed multiplier in `[0, 1]` for a follower heading to waypoint `i`
    /// from `point`.
    ///
    /// Before the slow-down index (or with a zero stopping distance) this
    /// is 1. From there on it is the distance to the finish boundary over
    /// the stopping distance.
    pub fn speed_factor(&self, i: usize, point: Vec2) -> f32 {
        if i < self.slow_down_index || self.stopping_distance <= 0.0 {
            return 1.0;
        }
        let Some(finish) = self.boundaries.last() else {
            return 0.0;
        };
        (finish.distance_from_point(point) / self.stopping_distance).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Where to head next and how fast, relative to full speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub target: Vec2,
    pub speed_factor: f32,
}

/// Follower state over a [`PathCorridor`].
#[derive(Debug, Clone)]
pub struct CorridorCursor {
    corridor: PathCorridor,
    index: usize,
    finished: bool,
}

impl CorridorCursor {
    pub fn new(corridor: PathCorridor) -> Self {
        let finished = corridor.is_empty();
        Self {
            corridor,
            index: 0,
            finished,
        }
    }

    pub fn corridor(&self) -> &PathCorridor {
        &self.corridor
    }

    /// Index of the waypoint currently steered towards.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance past every boundary `pos` has crossed and return the
    /// steering for this frame, or `None` once the follower has arrived.
    pub fn update(&mut self, pos: Vec2) -> Option<Steering> {
        if self.finished {
            return None;
        }
        while self.corridor.has_crossed(self.index, pos) {
            if self.index == self.corridor.finish_index() {
                self.finished = true;
                return None;
            }
            self.index += 1;
        }
        let speed_factor = self.corridor.speed_factor(self.index, pos);
        if speed_factor < STOP_SPEED_THRESHOLD {
            self.finished = true;
            return None;
        }
        Some(Steering {
            target: self.corridor.look_points[self.index],
            speed_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// Points every `step` units along the polyline `start -> waypoints`.
    fn walk(start: Vec2, waypoints: &[Vec2], step: f32) -> Vec<Vec2> {
        let mut out = vec![start];
        let mut pos = start;
        for &w in waypoints {
            while pos != w {
                pos = pos.move_towards(w, step);
                out.push(pos);
            }
        }
        out
    }

    #[test]
    fn boundaries_sit_before_corners_and_on_goal() {
        let c = PathCorridor::new(&[v(5.0, 0.0), v(5.0, 5.0)], Vec2::ZERO, 1.0, 2.0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.finish_index(), 1);
        assert_eq!(c.boundaries()[0].point(), v(4.0, 0.0));
        assert_eq!(c.boundaries()[0].direction(), v(1.0, 0.0));
        assert_eq!(c.boundaries()[1].point(), v(5.0, 5.0));
    }

    #[test]
    fn crossing_detection() {
        let c = PathCorridor::new(&[v(5.0, 0.0), v(5.0, 5.0)], Vec2::ZERO, 1.0, 2.0);
        assert!(!c.has_crossed(0, v(3.9, 0.0)));
        assert!(c.has_crossed(0, v(4.1, 0.0)));
        // Reaching the line off-axis still counts.
        assert!(c.has_crossed(0, v(4.5, 3.0)));
        assert!(!c.has_crossed(0, v(3.5, -3.0)));
        // Overshooting the goal counts as crossing the finish line.
        assert!(!c.has_crossed(1, v(5.0, 4.0)));
        assert!(c.has_crossed(1, v(5.0, 6.0)));
    }

    #[test]
    fn boundaries_are_crossed_once_walking_forward() {
        let waypoints = [v(4.0, 0.0), v(7.0, 3.0), v(7.0, 8.0), v(4.0, 8.0)];
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 1.0, 2.0);
        let mut samples = walk(Vec2::ZERO, &waypoints, 0.1);
        samples.push(v(3.5, 8.0));
        // Boundary i only matters once boundary i - 1 has been crossed.
        let mut from = 0;
        for i in 0..c.len() {
            let crossed: Vec<bool> = samples[from..]
                .iter()
                .map(|&p| c.has_crossed(i, p))
                .collect();
            let first = crossed.iter().position(|&x| x).expect("boundary crossed");
            assert!(
                crossed[first..].iter().all(|&x| x),
                "boundary {i} uncrossed again"
            );
            from += first;
        }
    }

    #[test]
    fn crossings_happen_in_path_order() {
        let waypoints = [v(4.0, 0.0), v(7.0, 3.0), v(7.0, 8.0)];
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 1.0, 2.0);
        let mut samples = walk(Vec2::ZERO, &waypoints, 0.1);
        samples.push(v(7.0, 8.5));
        let firsts: Vec<usize> = (0..c.len())
            .map(|i| {
                let first = samples
                    .iter()
                    .position(|&p| c.has_crossed(i, p))
                    .expect("boundary crossed");
                assert!(
                    samples[first..].iter().all(|&p| c.has_crossed(i, p)),
                    "boundary {i} uncrossed again"
                );
                first
            })
            .collect();
        assert!(firsts.windows(2).all(|w| w[0] <= w[1]), "{firsts:?}");
    }

    #[test]
    fn slow_down_index_accumulates_from_goal() {
        let waypoints = [v(2.0, 0.0), v(4.0, 0.0), v(6.0, 0.0), v(8.0, 0.0)];
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 0.5, 3.0);
        assert_eq!(c.slow_down_index(), 2);
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 0.5, 1.0);
        assert_eq!(c.slow_down_index(), 3);
        // Nothing exceeds the stopping distance.
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 0.5, 50.0);
        assert_eq!(c.slow_down_index(), 0);
    }

    #[test]
    fn speed_scales_with_distance_to_finish() {
        let waypoints = [v(2.0, 0.0), v(4.0, 0.0), v(6.0, 0.0), v(8.0, 0.0)];
        let c = PathCorridor::new(&waypoints, Vec2::ZERO, 0.5, 3.0);
        assert_eq!(c.speed_factor(1, v(3.0, 0.0)), 1.0);
        assert!(close(c.speed_factor(2, v(5.0, 0.0)), 1.0));
        assert!(close(c.speed_factor(3, v(6.5, 0.0)), 0.5));
        assert!(close(c.speed_factor(3, v(8.0, 0.0)), 0.0));

        let no_stop = PathCorridor::new(&waypoints, Vec2::ZERO, 0.5, 0.0);
        assert_eq!(no_stop.speed_factor(3, v(8.0, 0.0)), 1.0);
    }

    #[test]
    fn degenerate_first_segment_is_already_crossed() {
        let c = PathCorridor::new(&[v(1.0, 1.0)], v(1.0, 1.0), 1.0, 2.0);
        assert!(c.has_crossed(0, v(1.0, 1.0)));
        let mut cursor = CorridorCursor::new(c);
        assert_eq!(cursor.update(v(1.0, 1.0)), None);
        assert!(cursor.is_finished());
    }

    #[test]
    fn empty_corridor_finishes_immediately() {
        let c = PathCorridor::new(&[], Vec2::ZERO, 1.0, 2.0);
        assert!(c.is_empty());
        assert_eq!(c.finish_index(), 0);
        let mut cursor = CorridorCursor::new(c);
        assert_eq!(cursor.update(Vec2::ZERO), None);
    }

    #[test]
    fn cursor_follows_to_the_goal() {
        let waypoints = [v(4.0, 0.0), v(4.0, 4.0), v(8.0, 8.0)];
        let config = CorridorConfig::default();
        let mut cursor =
            CorridorCursor::new(PathCorridor::from_config(&waypoints, Vec2::ZERO, &config));
        let mut pos = Vec2::ZERO;
        let mut last_index = 0;
        let mut steps = 0;
        while let Some(steer) = cursor.update(pos) {
            assert!(cursor.index() >= last_index);
            last_index = cursor.index();
            assert!((0.0..=1.0).contains(&steer.speed_factor));
            pos = pos.move_towards(steer.target, 0.25 * steer.speed_factor);
            steps += 1;
            assert!(steps < 10_000, "follower never arrived");
        }
        assert!(cursor.is_finished());
        assert_eq!(last_index, cursor.corridor().finish_index());
        assert!(pos.distance(v(8.0, 8.0)) < 0.1);
        assert_eq!(cursor.update(pos), None);
    }
}
