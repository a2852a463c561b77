//! Collaborators an agent sees during a tick

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::world::VoxelWorld;

/// The player as seen by hostile agents
pub trait PlayerTarget {
    fn position(&self) -> Vec3;
    fn in_water(&self) -> bool;
    fn take_damage(&mut self, amount: i32);
}

/// Read-only inputs shared by every agent in a tick
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub world: &'a dyn VoxelWorld,
    pub config: &'a SimulationConfig,
    /// Positions of nearby threats (vehicles, explosions) that trigger fleeing
    pub hazards: &'a [Vec3],
    /// Escalation level of the spawner running the tick
    pub escalation: u8,
}

impl<'a> TickContext<'a> {
    pub fn new(world: &'a dyn VoxelWorld, config: &'a SimulationConfig) -> Self {
        Self {
            world,
            config,
            hazards: &[],
            escalation: 0,
        }
    }

    pub fn with_hazards(self, hazards: &'a [Vec3]) -> Self {
        Self { hazards, ..self }
    }

    pub fn with_escalation(self, escalation: u8) -> Self {
        Self { escalation, ..self }
    }
}

/// Minimal player implementation for headless runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub in_water: bool,
    pub health: i32,
    /// Number of `take_damage` calls received
    pub hits_taken: u32,
}

impl PlayerState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            in_water: false,
            health: 100,
            hits_taken: 0,
        }
    }

    /// Refresh `in_water` from the block at the player's chest
    pub fn sync_with_world(&mut self, world: &dyn VoxelWorld) {
        self.in_water = world.block_at(self.position + Vec3::Y).is_liquid()
            || world.block_at(self.position).is_liquid();
    }
}

impl PlayerTarget for PlayerState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn in_water(&self) -> bool {
        self.in_water
    }

    fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
        self.hits_taken += 1;
    }
}
