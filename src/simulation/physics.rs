//! Agent physics against the voxel world
//!
//! Forces first (gravity in air, sink/buoyancy/friction in water), then
//! axis-sequential movement: X, Y, Z are each advanced and tested on their
//! own. A revert on one axis never touches the other two.

use glam::Vec3;

use crate::core::config::SimulationConfig;
use crate::entity::archetype::{Archetype, VoidPolicy};
use crate::entity::Agent;
use crate::simulation::context::TickContext;
use crate::world::VoxelWorld;

/// Longest vertical move tested in one collision check
const MAX_VERTICAL_STEP: f32 = 0.5;

/// Which horizontal axes were reverted this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub blocked_x: bool,
    pub blocked_z: bool,
}

impl MoveOutcome {
    pub fn blocked(&self) -> bool {
        self.blocked_x || self.blocked_z
    }
}

/// Water at the feet or at chest height
pub fn is_submerged(
    world: &dyn VoxelWorld,
    position: Vec3,
    archetype: &Archetype,
    config: &SimulationConfig,
) -> bool {
    let chest = position + Vec3::Y * (archetype.body.height * config.chest_sample_fraction);
    world.block_at(position).is_liquid() || world.block_at(chest).is_liquid()
}

/// 0 at the surface, 1 at `depth` below it and deeper
pub fn submersion_ratio(y: f32, surface: f32, depth: f32) -> f32 {
    ((surface - y) / depth).clamp(0.0, 1.0)
}

/// Offsets of the collision sample points relative to the feet
///
/// Four corners at feet height and four just under the head.
pub fn sample_offsets(archetype: &Archetype, config: &SimulationConfig) -> [Vec3; 8] {
    let hw = archetype.body.half_width;
    let top = (archetype.body.height - config.head_clearance).max(0.0);
    let corners = [(-hw, -hw), (hw, -hw), (-hw, hw), (hw, hw)];

    let mut offsets = [Vec3::ZERO; 8];
    for (i, (dx, dz)) in corners.into_iter().enumerate() {
        offsets[i] = Vec3::new(dx, 0.0, dz);
        offsets[i + 4] = Vec3::new(dx, top, dz);
    }
    offsets
}

/// Any sample point inside a block this archetype cannot pass
pub fn collides(
    world: &dyn VoxelWorld,
    archetype: &Archetype,
    position: Vec3,
    config: &SimulationConfig,
) -> bool {
    sample_offsets(archetype, config)
        .iter()
        .any(|offset| archetype.blocks_movement(world.block_at(position + *offset)))
}

/// Horizontal move test: solid collision, or a swimmer leaving the water
fn horizontal_blocked(
    world: &dyn VoxelWorld,
    archetype: &Archetype,
    position: Vec3,
    swimming: bool,
    config: &SimulationConfig,
) -> bool {
    if collides(world, archetype, position, config) {
        return true;
    }
    archetype.flags.aquatic && swimming && !world.block_at(position).is_liquid()
}

/// Gravity in air; sink, buoyancy and damping in water
pub fn apply_vertical_forces(agent: &mut Agent, dt: f32, world: &dyn VoxelWorld) {
    let motion = agent.archetype().motion;

    if agent.in_water {
        let water = motion.water;
        let ratio = submersion_ratio(agent.position.y, world.water_surface(), water.submersion_depth);

        agent.velocity.y += (-water.sink_force + water.buoyancy * ratio) * dt;
        agent.velocity.y = (agent.velocity.y * water.vertical_friction)
            .clamp(-water.max_vertical_speed, water.max_vertical_speed);
        agent.velocity.x *= water.horizontal_friction;
        agent.velocity.z *= water.horizontal_friction;
    } else {
        agent.velocity.y = (agent.velocity.y - motion.gravity * dt).max(motion.terminal_velocity);
    }
}

/// Apply forces and move one axis at a time
pub fn integrate(agent: &mut Agent, dt: f32, ctx: &TickContext) -> MoveOutcome {
    apply_vertical_forces(agent, dt, ctx.world);

    let archetype = agent.archetype_arc();
    let config = ctx.config;
    let swimming = agent.in_water;
    let mut outcome = MoveOutcome::default();

    let previous_x = agent.position.x;
    agent.position.x += agent.velocity.x * dt;
    if horizontal_blocked(ctx.world, &archetype, agent.position, swimming, config) {
        agent.position.x = previous_x;
        outcome.blocked_x = true;
    }

    move_vertical(agent, agent.velocity.y * dt, ctx.world, &archetype, config);

    let previous_z = agent.position.z;
    agent.position.z += agent.velocity.z * dt;
    if horizontal_blocked(ctx.world, &archetype, agent.position, swimming, config) {
        agent.position.z = previous_z;
        outcome.blocked_z = true;
    }

    outcome
}

/// Advance Y in sub-steps shorter than a block so a fast fall cannot skip a
/// thin floor or end buried in the ground
fn move_vertical(
    agent: &mut Agent,
    dy: f32,
    world: &dyn VoxelWorld,
    archetype: &Archetype,
    config: &SimulationConfig,
) {
    let steps = (dy.abs() / MAX_VERTICAL_STEP).ceil().max(1.0) as u32;
    let step = dy / steps as f32;
    agent.on_ground = false;

    for _ in 0..steps {
        let previous_y = agent.position.y;
        agent.position.y += step;
        if !collides(world, archetype, agent.position, config) {
            continue;
        }

        if agent.velocity.y < 0.0 {
            agent.position.y =
                (agent.position.y - config.ground_snap_epsilon).floor() + 1.0 + config.ground_snap_offset;
            agent.on_ground = true;
            // Snapped into an overhang: stay where the last free sub-step was
            if collides(world, archetype, agent.position, config) {
                agent.position.y = previous_y;
            }
        } else {
            agent.position.y = previous_y;
        }
        agent.velocity.y = 0.0;
        return;
    }
}

/// Apply the archetype's void policy; returns true if the agent was below the floor
pub fn handle_void(agent: &mut Agent, config: &SimulationConfig) -> bool {
    if agent.position.y >= config.void_floor {
        return false;
    }

    match agent.archetype().void_policy {
        VoidPolicy::Despawn => {
            tracing::debug!("Agent {:?} fell out of the world at {:?}", agent.id, agent.position);
            agent.health = 0;
            agent.alive = false;
        }
        VoidPolicy::Teleport { altitude } => {
            tracing::debug!("Agent {:?} fell out of the world; reset to y={}", agent.id, altitude);
            agent.position.y = altitude;
            agent.velocity = Vec3::ZERO;
            agent.on_ground = false;
            agent.in_water = false;
        }
    }
    true
}
