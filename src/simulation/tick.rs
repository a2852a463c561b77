//! Tick system - drives every spawner once per frame
//!
//! The driver clamps the frame delta, then steps spawners in the order they
//! were registered. Nothing here suspends or blocks: a step is one
//! synchronous pass over in-memory state.

use std::path::Path;

use glam::Vec3;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::entity::archetype::{load_archetype_from, Archetype, ArchetypeKind};
use crate::entity::AgentView;
use crate::simulation::context::{PlayerTarget, TickContext};
use crate::simulation::spawner::{PopulationEvent, Spawner};
use crate::world::VoxelWorld;

/// Per-archetype population line in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationSummary {
    pub kind: ArchetypeKind,
    pub count: usize,
    pub cap: usize,
}

/// Serializable state for a HUD or a headless report
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub tick: Tick,
    pub elapsed: f32,
    pub wanted_level: u8,
    pub populations: Vec<PopulationSummary>,
    pub agents: Vec<AgentView>,
}

pub struct Simulation {
    pub config: SimulationConfig,
    spawners: Vec<Spawner>,
    tick: Tick,
    elapsed: f32,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            spawners: Vec::new(),
            tick: 0,
            elapsed: 0.0,
        }
    }

    /// One spawner per archetype, seeded from `seed` in order
    pub fn with_archetypes(config: SimulationConfig, archetypes: Vec<Archetype>, seed: u64) -> Self {
        let mut sim = Self::new(config);
        for (i, archetype) in archetypes.into_iter().enumerate() {
            sim.add_spawner(Spawner::new(archetype, seed.wrapping_add(i as u64)));
        }
        sim
    }

    pub fn with_default_archetypes(config: SimulationConfig, seed: u64) -> Self {
        let archetypes = ArchetypeKind::ALL.iter().map(|&kind| Archetype::builtin(kind)).collect();
        Self::with_archetypes(config, archetypes, seed)
    }

    /// Load every archetype from `<dir>/<kind>.toml`
    pub fn load(config: SimulationConfig, dir: &Path, seed: u64) -> Result<Self> {
        let archetypes = ArchetypeKind::ALL
            .iter()
            .map(|kind| load_archetype_from(dir, kind.file_stem()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_archetypes(config, archetypes, seed))
    }

    /// Spawners update in registration order
    pub fn add_spawner(&mut self, spawner: Spawner) {
        self.spawners.push(spawner);
    }

    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    pub fn spawner(&self, kind: ArchetypeKind) -> Option<&Spawner> {
        self.spawners.iter().find(|s| s.kind() == kind)
    }

    pub fn spawner_mut(&mut self, kind: ArchetypeKind) -> Option<&mut Spawner> {
        self.spawners.iter_mut().find(|s| s.kind() == kind)
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance every spawner by one clamped frame
    ///
    /// Returns population events from all spawners, in spawner order.
    pub fn step(
        &mut self,
        dt: f32,
        mut player: Option<&mut (dyn PlayerTarget + '_)>,
        world: &dyn VoxelWorld,
        hazards: &[Vec3],
    ) -> Vec<PopulationEvent> {
        let dt = self.config.clamp_dt(dt);
        let ctx = TickContext::new(world, &self.config).with_hazards(hazards);

        let mut events = Vec::new();
        for spawner in self.spawners.iter_mut() {
            events.extend(spawner.update(dt, player.as_deref_mut(), &ctx));
        }

        self.tick += 1;
        self.elapsed += dt;
        events
    }

    /// Forward an offense report to the escalation-gated spawners
    pub fn add_wanted(&mut self, amount: u32) {
        for spawner in self.spawners.iter_mut() {
            if spawner.archetype().flags.escalation_gated {
                spawner.add_wanted(amount);
            }
        }
    }

    /// Highest escalation level across spawners (0-5)
    pub fn wanted_level(&self) -> u8 {
        self.spawners.iter().map(Spawner::wanted_level).max().unwrap_or(0)
    }

    pub fn count(&self, kind: ArchetypeKind) -> usize {
        self.spawner(kind).map(Spawner::count).unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.spawners.iter().map(Spawner::count).sum()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            elapsed: self.elapsed,
            wanted_level: self.wanted_level(),
            populations: self
                .spawners
                .iter()
                .map(|s| PopulationSummary {
                    kind: s.kind(),
                    count: s.count(),
                    cap: s.current_max_population(),
                })
                .collect(),
            agents: self.spawners.iter().flat_map(Spawner::views).collect(),
        }
    }
}
