//! Agent state and per-tick update
//!
//! An agent owns its kinematic state, AI state and countdowns. The update
//! itself is split across the simulation systems: `ai` steers and attacks,
//! `physics` integrates and resolves collisions against the voxel world.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::AgentId;
use crate::entity::archetype::{Archetype, ArchetypeKind};
use crate::entity::timers::Countdown;
use crate::simulation::ai;
use crate::simulation::context::{PlayerTarget, TickContext};
use crate::simulation::physics;

/// AI state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    #[default]
    Wander,
    Chase,
    Attack,
    Flee,
    /// Archetype-specific stationary pause
    Special,
}

/// Countdowns an agent carries; all clamp at zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTimers {
    /// Time left on the current wander direction
    pub wander: Countdown,
    pub attack_cooldown: Countdown,
    /// Time left on the current flee
    pub flee: Countdown,
    /// Time until the next special idle may start
    pub special_cooldown: Countdown,
    /// Time left in the current special idle
    pub special_remaining: Countdown,
}

impl AgentTimers {
    pub fn tick(&mut self, dt: f32) {
        self.wander.tick(dt);
        self.attack_cooldown.tick(dt);
        self.flee.tick(dt);
        self.special_cooldown.tick(dt);
        self.special_remaining.tick(dt);
    }
}

/// What a presentation layer needs to draw an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub kind: ArchetypeKind,
    pub position: Vec3,
    pub facing: f32,
    pub state: AiState,
    pub health: i32,
}

/// A simulated NPC
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub health: i32,
    pub alive: bool,
    /// Yaw in radians; 0 faces +Z
    pub facing: f32,
    pub on_ground: bool,
    pub in_water: bool,
    pub state: AiState,
    pub timers: AgentTimers,
    /// Unit heading held while wandering
    pub wander_dir: Vec3,
    /// Unit heading held while fleeing
    pub flee_dir: Vec3,
    archetype: Arc<Archetype>,
}

impl Agent {
    pub fn new<R: Rng + ?Sized>(position: Vec3, archetype: Arc<Archetype>, rng: &mut R) -> Self {
        let mut timers = AgentTimers::default();
        if archetype.flags.has_special_idle {
            let idle = &archetype.special_idle;
            timers
                .special_cooldown
                .set(rng.gen_range(idle.interval_min..=idle.interval_max));
        }

        Self {
            id: AgentId::new(),
            position,
            velocity: Vec3::ZERO,
            health: archetype.max_health,
            alive: true,
            facing: 0.0,
            on_ground: false,
            in_water: false,
            state: AiState::Wander,
            timers,
            wander_dir: Vec3::ZERO,
            flee_dir: Vec3::ZERO,
            archetype,
        }
    }

    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    pub(crate) fn archetype_arc(&self) -> Arc<Archetype> {
        Arc::clone(&self.archetype)
    }

    pub fn kind(&self) -> ArchetypeKind {
        self.archetype.kind
    }

    /// Advance one tick: timers, submersion, AI, physics, void check
    ///
    /// A zero or negative `dt` leaves the agent untouched.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: Option<&mut (dyn PlayerTarget + '_)>,
        ctx: &TickContext,
        rng: &mut R,
    ) {
        if !self.alive || dt <= 0.0 {
            return;
        }

        self.timers.tick(dt);
        self.in_water = physics::is_submerged(ctx.world, self.position, &self.archetype, ctx.config);

        ai::steer(self, player, ctx, rng);

        let outcome = physics::integrate(self, dt, ctx);
        ai::react_to_blocked(self, outcome, rng);

        physics::handle_void(self, ctx.config);
    }

    pub fn take_damage(&mut self, amount: i32) {
        if !self.alive {
            return;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
        }
    }

    /// Chasing or attacking the player
    pub fn is_engaged(&self) -> bool {
        self.alive && matches!(self.state, AiState::Chase | AiState::Attack)
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            kind: self.kind(),
            position: self.position,
            facing: self.facing,
            state: self.state,
            health: self.health,
        }
    }
}
