use crate::config::AgentConfig;
use crate::pathfinding::{GridPathfinder, Position};

/// Steers an agent along the waypoints returned by a [`GridPathfinder`].
///
/// Positions are world-space `(x, y)`; `world_offset` is added before querying
/// the grid and subtracted again from each waypoint. The held path is dropped
/// and re-queried once its lifetime runs out, and when no path exists the
/// agent heads for the goal in a straight line.
#[derive(Clone, Debug)]
pub struct PathFollower {
    pub world_offset: (f32, f32),
    pub arrival_radius: f32,
    pub path_lifetime: f32,
    /// Lifetime consumed per update
    pub lifetime_decay: f32,

    path: Option<Vec<Position>>,
    current_node: usize,
    remaining_lifetime: f32,
    target: Option<(f32, f32)>,
}

impl PathFollower {
    pub fn new(world_offset: (f32, f32), arrival_radius: f32, path_lifetime: f32, lifetime_decay: f32) -> Self {
        PathFollower {
            world_offset,
            arrival_radius,
            path_lifetime,
            lifetime_decay,
            path: None,
            current_node: 0,
            remaining_lifetime: path_lifetime,
            target: None,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            (config.world_offset_x, config.world_offset_y),
            config.arrival_radius,
            config.path_lifetime,
            config.lifetime_decay,
        )
    }

    pub fn path(&self) -> Option<&[Position]> {
        self.path.as_deref()
    }

    pub fn current_node(&self) -> usize {
        self.current_node
    }

    pub fn remaining_lifetime(&self) -> f32 {
        self.remaining_lifetime
    }

    /// Advance one tick and return the world-space point to steer toward
    pub fn update(&mut self, pathfinder: &GridPathfinder, position: (f32, f32), goal: (f32, f32)) -> (f32, f32) {
        let target = self.target.unwrap_or(goal);
        let distance = length((target.0 - position.0, target.1 - position.1));

        self.remaining_lifetime -= self.lifetime_decay;

        if let Some(path) = &self.path {
            if self.current_node + 1 < path.len() && distance < self.arrival_radius {
                self.current_node += 1;
                self.target = Some(self.to_world(path[self.current_node]));
            }
        }

        if self.path.is_none() || self.remaining_lifetime < 0.0 {
            self.replan(pathfinder, position, goal);
        }

        self.target.unwrap_or(goal)
    }

    fn replan(&mut self, pathfinder: &GridPathfinder, position: (f32, f32), goal: (f32, f32)) {
        let (ox, oy) = self.world_offset;
        self.path = pathfinder.get_path((position.0 + ox, position.1 + oy), (goal.0 + ox, goal.1 + oy));

        match self.path.as_ref().and_then(|p| p.first().copied()) {
            Some(first) => {
                self.current_node = 0;
                self.target = Some(self.to_world(first));
                self.remaining_lifetime = self.path_lifetime;
            }
            None => {
                // Direct-line fallback
                self.target = Some(goal);
            }
        }
    }

    fn to_world(&self, cell: Position) -> (f32, f32) {
        (cell.x as f32 - self.world_offset.0, cell.y as f32 - self.world_offset.1)
    }
}

/// Planar acceleration that turns `velocity` toward `target` at `max_speed`
pub fn steer(position: (f32, f32), velocity: (f32, f32), target: (f32, f32), max_speed: f32, gain: f32) -> (f32, f32) {
    let dx = target.0 - position.0;
    let dy = target.1 - position.1;
    let distance = length((dx, dy));

    let (ideal_x, ideal_y) = if distance > f32::EPSILON {
        (dx / distance * max_speed, dy / distance * max_speed)
    } else {
        (0.0, 0.0)
    };

    ((ideal_x - velocity.0) * gain, (ideal_y - velocity.1) * gain)
}

fn length(v: (f32, f32)) -> f32 {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}
