//! Simulation configuration with documented constants
//!
//! Kernel-wide numbers live here. Per-kind tuning (speeds, ranges, spawn
//! rings) lives in the archetype descriptors instead.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the agent kernel and the tick driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === TIME ===
    /// Upper bound on a single step (seconds)
    ///
    /// A stalled frame can hand the driver a huge dt. Clamping it bounds the
    /// distance an agent can travel through the axis-sequential collision
    /// resolver in one step.
    pub max_dt: f32,

    // === WORLD BOUNDS ===
    /// Height below which an agent counts as fallen out of the world
    pub void_floor: f32,

    // === COLLISION ===
    /// Distance subtracted from y before flooring when landing
    ///
    /// Landing snaps to `floor(y - ground_snap_epsilon) + 1 + ground_snap_offset`.
    pub ground_snap_epsilon: f32,

    /// Height left between the feet and the top of the landed-on block
    ///
    /// Must be smaller than `ground_snap_epsilon` so the next tick's gravity
    /// step lands on the same block again.
    pub ground_snap_offset: f32,

    /// Gap between the top of the body and the upper collision sample
    pub head_clearance: f32,

    /// Fraction of body height used for the chest submersion sample
    pub chest_sample_fraction: f32,

    // === STEERING ===
    /// Directions shorter than this are treated as zero (no rotation)
    pub min_direction_length: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_dt: 0.1,
            void_floor: -10.0,
            ground_snap_epsilon: 0.01,
            ground_snap_offset: 0.001,
            head_clearance: 0.1,
            chest_sample_fraction: 0.6,
            min_direction_length: 1e-4,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: SimulationConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_dt <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "max_dt ({}) must be positive",
                self.max_dt
            )));
        }

        if self.ground_snap_offset >= self.ground_snap_epsilon {
            return Err(SimError::InvalidConfig(format!(
                "ground_snap_offset ({}) should be < ground_snap_epsilon ({})",
                self.ground_snap_offset, self.ground_snap_epsilon
            )));
        }

        if !(0.0..=1.0).contains(&self.chest_sample_fraction) {
            return Err(SimError::InvalidConfig(
                "chest_sample_fraction must be within [0, 1]".into(),
            ));
        }

        Ok(())
    }

    /// Clamp a frame delta into `[0, max_dt]`
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt)
    }
}
