//! Local, memoryless steering.
//!
//! Velocity = seek toward the current target + separation from nearby agents,
//! clamped to max speed. Nothing is remembered between calls; crowd behavior
//! comes from recomputing every tick with live neighbor positions.

use super::fixed_math::{FixedNum, FixedVec2};
use super::flow_field::FlowField;
use super::types::Path;

/// A nearby agent as seen by the one being steered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub position: FixedVec2,
    pub radius: FixedNum,
}

impl Neighbor {
    pub fn new(position: FixedVec2, radius: FixedNum) -> Self {
        Self { position, radius }
    }
}

/// Steering constants in fixed point. Build from [`NavConfig`](super::config::NavConfig)
/// or use the defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringConfig {
    /// Closer than this to the target cell center counts as arrived.
    pub arrival_threshold: FixedNum,
    /// Neighbors closer than this are treated as coincident and ignored.
    pub min_neighbor_distance: FixedNum,
    /// Added to a neighbor's radius to get its repulsion range.
    pub personal_space: FixedNum,
    /// Separation is scaled by `max_speed * separation_scale`.
    pub separation_scale: FixedNum,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: FixedNum::from_num(0.01f32),
            min_neighbor_distance: FixedNum::from_num(0.001f32),
            personal_space: FixedNum::from_num(0.5f32),
            separation_scale: FixedNum::from_num(0.5f32),
        }
    }
}

/// Sum of push-away forces from neighbors inside their repulsion range.
///
/// Each intruding neighbor contributes a unit vector away from it weighted by
/// `(reach - d) / reach`, where `reach = radius + personal_space`. The sum is
/// scaled by `max_speed * separation_scale`.
pub fn separation_force(
    config: &SteeringConfig,
    agent: FixedVec2,
    max_speed: FixedNum,
    neighbors: &[Neighbor],
) -> FixedVec2 {
    let mut accum = FixedVec2::ZERO;

    for neighbor in neighbors {
        let reach = neighbor.radius + config.personal_space;
        if reach <= FixedNum::ZERO {
            continue;
        }
        let away = agent - neighbor.position;
        let dist = away.length();
        if dist >= reach || dist <= config.min_neighbor_distance {
            continue;
        }

        let strength = (reach - dist) / reach;
        accum += away / dist * strength;
    }

    accum * (max_speed * config.separation_scale)
}

/// Velocity for an agent following `path`, currently heading for
/// `path[waypoint_index]`. Uses [`SteeringConfig::default`].
///
/// Returns zero once `waypoint_index` runs past the end of the path or the agent
/// is within the arrival threshold of the target cell's center. Advancing the
/// index is the movement integrator's job.
pub fn steer(
    agent: FixedVec2,
    max_speed: FixedNum,
    path: &Path,
    waypoint_index: usize,
    neighbors: &[Neighbor],
) -> FixedVec2 {
    steer_with(&SteeringConfig::default(), agent, max_speed, path, waypoint_index, neighbors)
}

pub fn steer_with(
    config: &SteeringConfig,
    agent: FixedVec2,
    max_speed: FixedNum,
    path: &Path,
    waypoint_index: usize,
    neighbors: &[Neighbor],
) -> FixedVec2 {
    let Some(target) = path.get(waypoint_index) else {
        return FixedVec2::ZERO;
    };

    let to_target = target.center() - agent;
    let dist = to_target.length();
    if dist <= config.arrival_threshold {
        return FixedVec2::ZERO;
    }

    let seek = to_target / dist * max_speed;
    let separation = separation_force(config, agent, max_speed, neighbors);
    (seek + separation).clamp_length(max_speed)
}

/// Velocity for an agent moving on a flow field instead of a path.
///
/// Seeks along the field direction of the agent's cell. On the goal cell or an
/// unreachable cell the direction is zero and only separation applies.
pub fn steer_along_flow(
    agent: FixedVec2,
    max_speed: FixedNum,
    field: &FlowField,
    neighbors: &[Neighbor],
) -> FixedVec2 {
    steer_along_flow_with(&SteeringConfig::default(), agent, max_speed, field, neighbors)
}

pub fn steer_along_flow_with(
    config: &SteeringConfig,
    agent: FixedVec2,
    max_speed: FixedNum,
    field: &FlowField,
    neighbors: &[Neighbor],
) -> FixedVec2 {
    let seek = field.sample(agent) * max_speed;
    let separation = separation_force(config, agent, max_speed, neighbors);
    (seek + separation).clamp_length(max_speed)
}

#[cfg(test)]
#[path = "steering_tests.rs"]
mod tests;
