use tilenav_core::Vec2;
use tilenav_paths::{CorridorConfig, CorridorCursor, PathCorridor};

#[derive(Debug)]
pub enum AgentState {
    /// Request submitted, no result yet.
    Waiting,
    Following(CorridorCursor),
    Arrived,
    /// No path to the goal.
    Stranded,
}

#[derive(Debug)]
pub struct Agent {
    pub id: usize,
    pub pos: Vec2,
    pub goal: Vec2,
    /// World units per second at full speed.
    pub speed: f32,
    pub state: AgentState,
    pub trail: Vec<Vec2>,
}

impl Agent {
    pub fn new(id: usize, pos: Vec2, goal: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            goal,
            speed,
            state: AgentState::Waiting,
            trail: vec![pos],
        }
    }

    /// Apply a delivered path result.
    pub fn receive_path(&mut self, waypoints: Vec<Vec2>, success: bool, config: &CorridorConfig) {
        if !success {
            log::warn!("agent {} has no route to {}", self.id, self.goal);
            self.state = AgentState::Stranded;
            return;
        }
        log::info!(
            "agent {} got {} waypoint(s) towards {}",
            self.id,
            waypoints.len(),
            self.goal
        );
        let corridor = PathCorridor::from_config(&waypoints, self.pos, config);
        self.state = AgentState::Following(CorridorCursor::new(corridor));
    }

    /// Advance by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let steering = match &mut self.state {
            AgentState::Following(cursor) => cursor.update(self.pos),
            _ => return,
        };
        match steering {
            Some(steer) => {
                self.pos = self
                    .pos
                    .move_towards(steer.target, self.speed * steer.speed_factor * dt);
                self.trail.push(self.pos);
            }
            None => {
                log::info!(
                    "agent {} arrived at {} ({:.2} from goal)",
                    self.id,
                    self.pos,
                    self.pos.distance(self.goal)
                );
                self.state = AgentState::Arrived;
            }
        }
    }

    /// Whether the agent no longer needs ticking.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, AgentState::Arrived | AgentState::Stranded)
    }
}
