//! AI state machine
//!
//! Evaluated every tick in a fixed order:
//! 1. Flee, if the archetype can and a threat is inside the trigger radius
//!    (or a flee is still running)
//! 2. Attack or chase, if the archetype is hostile and the player is detected
//! 3. Special idle or wander
//!
//! Steering writes horizontal velocity (and vertical, for swimmers chasing
//! in 3D); physics integrates it afterwards.

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use glam::Vec3;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::types::{facing_of, heading_vector, horizontal};
use crate::entity::archetype::{Archetype, BlockedPolicy};
use crate::entity::{Agent, AiState};
use crate::simulation::context::{PlayerTarget, TickContext};
use crate::simulation::physics::MoveOutcome;

/// Share of chase speed a swimmer puts into climbing or diving
const SWIM_VERTICAL_CHASE: f32 = 0.5;

/// Closest threat within `radius`, if any
pub fn nearest_threat(
    position: Vec3,
    hazards: &[Vec3],
    extra: Option<Vec3>,
    radius: f32,
) -> Option<Vec3> {
    hazards
        .iter()
        .copied()
        .chain(extra)
        .filter(|threat| threat.distance(position) <= radius)
        .min_by_key(|threat| OrderedFloat(threat.distance_squared(position)))
}

/// Whether this archetype goes after the player right now
pub fn is_hostile_toward(archetype: &Archetype, target: &dyn PlayerTarget, escalation: u8) -> bool {
    let flags = &archetype.flags;
    let aggressive = flags.always_aggressive || (flags.escalation_gated && escalation > 0);
    aggressive && (!flags.aquatic || target.in_water())
}

/// Pick the state for this tick and set the matching velocity
///
/// Leaving a special pause for any reason re-arms its cooldown.
pub fn steer<R: Rng + ?Sized>(
    agent: &mut Agent,
    player: Option<&mut (dyn PlayerTarget + '_)>,
    ctx: &TickContext,
    rng: &mut R,
) {
    let was_special = agent.state == AiState::Special;
    choose_state(agent, player, ctx, rng);

    if was_special && agent.state != AiState::Special && agent.timers.special_cooldown.is_done() {
        let archetype = agent.archetype_arc();
        end_special(agent, &archetype, rng);
    }
}

fn choose_state<R: Rng + ?Sized>(
    agent: &mut Agent,
    player: Option<&mut (dyn PlayerTarget + '_)>,
    ctx: &TickContext,
    rng: &mut R,
) {
    let archetype = agent.archetype_arc();
    let min_len = ctx.config.min_direction_length;

    if archetype.flags.can_flee && flee(agent, &archetype, player.as_deref().map(|p| p.position()), ctx, rng) {
        return;
    }

    if let Some(target) = player {
        if is_hostile_toward(&archetype, &*target, ctx.escalation) {
            let to_target = target.position() - agent.position;
            let distance = to_target.length();
            let combat = &archetype.combat;

            if distance <= combat.attack_range {
                agent.state = AiState::Attack;
                stop_horizontal(agent);
                face(agent, to_target, min_len);
                if agent.timers.attack_cooldown.is_done() {
                    target.take_damage(combat.damage);
                    agent.timers.attack_cooldown.set(combat.attack_interval);
                }
                return;
            }

            if distance <= combat.detection_range {
                agent.state = AiState::Chase;
                let heading = if archetype.flags.aquatic { to_target } else { horizontal(to_target) };
                if heading.length() >= min_len {
                    let dir = heading.normalize();
                    let speed = archetype.base_speed * archetype.chase_multiplier(ctx.escalation);
                    agent.velocity.x = dir.x * speed;
                    agent.velocity.z = dir.z * speed;
                    if archetype.flags.aquatic {
                        agent.velocity.y = dir.y * speed * SWIM_VERTICAL_CHASE;
                    }
                    face(agent, dir, min_len);
                } else {
                    stop_horizontal(agent);
                }
                return;
            }
        }
    }

    idle(agent, &archetype, min_len, rng);
}

/// Returns true if the agent is fleeing this tick
fn flee<R: Rng + ?Sized>(
    agent: &mut Agent,
    archetype: &Archetype,
    player_pos: Option<Vec3>,
    ctx: &TickContext,
    rng: &mut R,
) -> bool {
    let params = archetype.flee;
    let extra = player_pos.filter(|_| params.include_player);

    if let Some(threat) = nearest_threat(agent.position, ctx.hazards, extra, params.trigger_radius) {
        let away = horizontal(agent.position - threat);
        agent.flee_dir = if away.length() >= ctx.config.min_direction_length {
            away.normalize()
        } else {
            heading_vector(rng.gen_range(0.0..TAU))
        };
        agent.timers.flee.set(params.duration);
        agent.state = AiState::Flee;
    }

    if agent.state != AiState::Flee {
        return false;
    }
    if agent.timers.flee.is_done() {
        agent.state = AiState::Wander;
        return false;
    }

    let velocity = agent.flee_dir * archetype.base_speed * params.speed_multiplier;
    agent.velocity.x = velocity.x;
    agent.velocity.z = velocity.z;
    let dir = agent.flee_dir;
    face(agent, dir, ctx.config.min_direction_length);
    true
}

/// Special idle if due, otherwise wander
fn idle<R: Rng + ?Sized>(agent: &mut Agent, archetype: &Archetype, min_len: f32, rng: &mut R) {
    if agent.state == AiState::Special {
        if !agent.timers.special_remaining.is_done() {
            stop_horizontal(agent);
            return;
        }
        end_special(agent, archetype, rng);
        agent.state = AiState::Wander;
    }

    if archetype.flags.has_special_idle && agent.timers.special_cooldown.is_done() {
        agent.state = AiState::Special;
        agent.timers.special_remaining.set(archetype.special_idle.duration);
        stop_horizontal(agent);
        return;
    }

    agent.state = AiState::Wander;
    if agent.timers.wander.is_done() {
        let wander = &archetype.wander;
        reroll_wander(agent, wander.hold_min..=wander.hold_max, rng);
    }

    let speed = archetype.base_speed * archetype.wander.speed_fraction;
    agent.velocity.x = agent.wander_dir.x * speed;
    agent.velocity.z = agent.wander_dir.z * speed;
    let dir = agent.wander_dir;
    face(agent, dir, min_len);
}

/// Blocked-axis policy, run after physics
pub fn react_to_blocked<R: Rng + ?Sized>(agent: &mut Agent, outcome: MoveOutcome, rng: &mut R) {
    if !outcome.blocked() {
        return;
    }

    let archetype = agent.archetype_arc();
    if archetype.blocked_policy == BlockedPolicy::JumpWhenChasing
        && agent.state == AiState::Chase
        && agent.on_ground
    {
        agent.velocity.y = archetype.motion.jump_speed;
        agent.on_ground = false;
        return;
    }

    match agent.state {
        AiState::Wander => {
            let wander = &archetype.wander;
            reroll_wander(agent, wander.blocked_hold_min..=wander.blocked_hold_max, rng);
        }
        AiState::Flee => {
            let wander = &archetype.wander;
            reroll_wander(agent, wander.blocked_hold_min..=wander.blocked_hold_max, rng);
            agent.flee_dir = agent.wander_dir;
        }
        _ => {}
    }
}

/// Cancel any remaining pause and roll the wait until the next one
fn end_special<R: Rng + ?Sized>(agent: &mut Agent, archetype: &Archetype, rng: &mut R) {
    let params = &archetype.special_idle;
    agent.timers.special_remaining.clear();
    agent
        .timers
        .special_cooldown
        .set(rng.gen_range(params.interval_min..=params.interval_max));
}

fn reroll_wander<R: Rng + ?Sized>(agent: &mut Agent, hold: RangeInclusive<f32>, rng: &mut R) {
    agent.wander_dir = heading_vector(rng.gen_range(0.0..TAU));
    agent.timers.wander.set(rng.gen_range(hold));
}

fn stop_horizontal(agent: &mut Agent) {
    agent.velocity.x = 0.0;
    agent.velocity.z = 0.0;
}

fn face(agent: &mut Agent, dir: Vec3, min_len: f32) {
    if let Some(yaw) = facing_of(dir, min_len) {
        agent.facing = yaw;
    }
}
