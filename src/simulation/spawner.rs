//! Spawner / population manager for one archetype
//!
//! Keeps a bounded population scattered on a ring around the player:
//! spawns on a cooldown, advances every agent, then removes the dead, the
//! fallen and the far away. The agent list is owned exclusively by the
//! spawner; removal walks it back to front so indices stay valid.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec3;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::types::{horizontal_distance, AgentId};
use crate::entity::archetype::{Archetype, ArchetypeKind};
use crate::entity::{Agent, AgentView, Countdown};
use crate::simulation::context::{PlayerTarget, TickContext};
use crate::simulation::escalation::WantedLevel;
use crate::world::VoxelWorld;

/// Height above the ground block at which land agents appear
const SPAWN_LIFT: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DespawnReason {
    Killed,
    FellOutOfWorld,
    OutOfRange,
    /// Culled because the population cap dropped below the live count
    OverCapacity,
}

/// Population changes a presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PopulationEvent {
    Spawned {
        id: AgentId,
        kind: ArchetypeKind,
        position: Vec3,
    },
    Despawned {
        id: AgentId,
        kind: ArchetypeKind,
        reason: DespawnReason,
    },
}

#[derive(Debug, Clone)]
pub struct Spawner {
    archetype: Arc<Archetype>,
    agents: Vec<Agent>,
    spawn_cooldown: Countdown,
    /// Present only for archetypes with an escalation table
    wanted: Option<WantedLevel>,
    rng: ChaCha8Rng,
}

impl Spawner {
    pub fn new(archetype: Archetype, seed: u64) -> Self {
        Self::with_shared(Arc::new(archetype), seed)
    }

    pub fn with_shared(archetype: Arc<Archetype>, seed: u64) -> Self {
        let wanted = archetype.escalation.as_ref().map(WantedLevel::from_params);
        Self {
            archetype,
            agents: Vec::new(),
            spawn_cooldown: Countdown::default(),
            wanted,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    pub fn kind(&self) -> ArchetypeKind {
        self.archetype.kind
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn views(&self) -> Vec<AgentView> {
        self.agents.iter().map(Agent::view).collect()
    }

    pub fn count(&self) -> usize {
        self.agents.len()
    }

    /// Current escalation level, 0 for archetypes without one
    pub fn wanted_level(&self) -> u8 {
        self.wanted.as_ref().map(WantedLevel::level).unwrap_or(0)
    }

    /// Raise the escalation level; ignored by archetypes without one
    pub fn add_wanted(&mut self, amount: u32) {
        match self.wanted.as_mut() {
            Some(wanted) => wanted.add(amount),
            None => tracing::debug!(kind = ?self.kind(), "add_wanted ignored: no escalation"),
        }
    }

    pub fn current_max_population(&self) -> usize {
        self.archetype.population_cap(self.wanted_level())
    }

    /// Seconds until the next attempt after a spawn attempt at the current level
    pub fn spawn_interval(&self) -> f32 {
        self.archetype.spawn.interval * self.archetype.spawn_interval_multiplier(self.wanted_level())
    }

    /// Apply damage from outside the kernel (player attacks)
    ///
    /// A killed agent is removed on the next `update`. Returns false if the
    /// id is unknown.
    pub fn damage_agent(&mut self, id: AgentId, amount: i32) -> bool {
        match self.agents.iter_mut().find(|a| a.id == id) {
            Some(agent) => {
                agent.take_damage(amount);
                true
            }
            None => false,
        }
    }

    /// Advance the population by one step
    ///
    /// `dt` is used as given; clamping is the driver's job. A non-positive
    /// `dt` changes nothing.
    pub fn update(
        &mut self,
        dt: f32,
        mut player: Option<&mut (dyn PlayerTarget + '_)>,
        ctx: &TickContext,
    ) -> Vec<PopulationEvent> {
        let mut events = Vec::new();
        if dt <= 0.0 {
            return events;
        }

        if let Some(wanted) = self.wanted.as_mut() {
            wanted.tick(dt);
        }
        self.spawn_cooldown.tick(dt);

        let anchor = player.as_deref().map(|p| p.position());
        if let Some(anchor) = anchor {
            let cap = self.current_max_population();
            if self.spawn_cooldown.is_done() && cap > 0 && self.agents.len() < cap {
                if let Some(id) = self.try_spawn(anchor, ctx.world) {
                    if let Some(agent) = self.agent(id) {
                        events.push(PopulationEvent::Spawned {
                            id,
                            kind: self.kind(),
                            position: agent.position,
                        });
                    }
                }
                self.spawn_cooldown.set(self.spawn_interval());
            }
        }

        let ctx = ctx.with_escalation(self.wanted_level());
        for agent in self.agents.iter_mut() {
            agent.update(dt, player.as_deref_mut(), &ctx, &mut self.rng);
        }

        self.remove_departed(anchor, ctx.config, &mut events);
        self.cull_over_capacity(anchor, &mut events);
        events
    }

    /// One placement attempt on the spawn ring around `anchor`
    ///
    /// Returns the new agent's id, or `None` if the site was rejected or the
    /// population is already at its cap. Rejection is a normal outcome.
    pub fn try_spawn(&mut self, anchor: Vec3, world: &dyn VoxelWorld) -> Option<AgentId> {
        if self.agents.len() >= self.current_max_population() {
            return None;
        }

        let rules = &self.archetype.spawn;
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = self.rng.gen_range(rules.ring_min..=rules.ring_max);
        let bx = (anchor.x + angle.cos() * distance).floor() as i32;
        let bz = (anchor.z + angle.sin() * distance).floor() as i32;

        let position = if self.archetype.flags.aquatic {
            self.water_site(world, bx, bz)
        } else {
            self.land_site(world, bx, bz)
        }?;

        let agent = Agent::new(position, Arc::clone(&self.archetype), &mut self.rng);
        let id = agent.id;
        tracing::debug!(kind = ?self.kind(), %id, ?position, "Spawned agent");
        self.agents.push(agent);
        Some(id)
    }

    fn land_site(&self, world: &dyn VoxelWorld, bx: i32, bz: i32) -> Option<Vec3> {
        let ground = world.spawn_height(bx, bz);
        let min_ground = world.water_level() + self.archetype.spawn.min_ground_above_water;
        if ground < min_ground {
            tracing::trace!(bx, bz, ground, "Spawn rejected: too low");
            return None;
        }
        if !self.archetype.blocks_movement(world.block(bx, ground, bz)) {
            tracing::trace!(bx, bz, ground, "Spawn rejected: ground not solid");
            return None;
        }
        if world.block(bx, ground + 1, bz).is_liquid() {
            tracing::trace!(bx, bz, ground, "Spawn rejected: submerged ground");
            return None;
        }
        Some(Vec3::new(
            bx as f32 + 0.5,
            ground as f32 + 1.0 + SPAWN_LIFT,
            bz as f32 + 0.5,
        ))
    }

    fn water_site(&self, world: &dyn VoxelWorld, bx: i32, bz: i32) -> Option<Vec3> {
        let rules = &self.archetype.spawn;
        let water = world.water_level();
        let ground = world.spawn_height(bx, bz);
        if ground > water - rules.min_water_depth {
            tracing::trace!(bx, bz, ground, "Spawn rejected: water too shallow");
            return None;
        }
        let column_is_water = (0..rules.min_water_depth).all(|d| world.block(bx, water - d, bz).is_liquid());
        if !column_is_water {
            tracing::trace!(bx, bz, "Spawn rejected: water column obstructed");
            return None;
        }
        Some(Vec3::new(
            bx as f32 + 0.5,
            world.water_surface() - rules.spawn_depth,
            bz as f32 + 0.5,
        ))
    }

    fn despawn_reason(&self, agent: &Agent, anchor: Option<Vec3>, config: &SimulationConfig) -> Option<DespawnReason> {
        if agent.position.y < config.void_floor {
            return Some(DespawnReason::FellOutOfWorld);
        }
        if !agent.alive || agent.health <= 0 {
            return Some(DespawnReason::Killed);
        }
        let anchor = anchor?;
        let rules = &self.archetype.spawn;
        let radius = if agent.is_engaged() {
            rules.engaged_despawn_radius
        } else {
            rules.despawn_radius
        };
        if horizontal_distance(agent.position, anchor) > radius {
            return Some(DespawnReason::OutOfRange);
        }
        None
    }

    fn remove_departed(&mut self, anchor: Option<Vec3>, config: &SimulationConfig, events: &mut Vec<PopulationEvent>) {
        for i in (0..self.agents.len()).rev() {
            if let Some(reason) = self.despawn_reason(&self.agents[i], anchor, config) {
                let agent = self.agents.remove(i);
                self.log_despawn(&agent, reason, events);
            }
        }
    }

    /// Drop agents until the live count fits the cap, farthest idle ones first
    fn cull_over_capacity(&mut self, anchor: Option<Vec3>, events: &mut Vec<PopulationEvent>) {
        let cap = self.current_max_population();
        while self.agents.len() > cap {
            let victim = self
                .agents
                .iter()
                .enumerate()
                .max_by_key(|(_, agent)| {
                    let distance = anchor.map(|a| horizontal_distance(agent.position, a)).unwrap_or(0.0);
                    (!agent.is_engaged(), OrderedFloat(distance))
                })
                .map(|(i, _)| i);
            let Some(i) = victim else { break };
            let agent = self.agents.remove(i);
            self.log_despawn(&agent, DespawnReason::OverCapacity, events);
        }
    }

    fn log_despawn(&self, agent: &Agent, reason: DespawnReason, events: &mut Vec<PopulationEvent>) {
        tracing::debug!(kind = ?self.kind(), id = %agent.id, ?reason, "Despawned agent");
        events.push(PopulationEvent::Despawned {
            id: agent.id,
            kind: self.kind(),
            reason,
        });
    }
}
