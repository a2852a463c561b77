//! Wanted level for escalation-gated archetypes
//!
//! The level rises when an external combat system reports an offense and
//! drops by one every `decay_interval` seconds while above zero.

use serde::Serialize;

use crate::entity::archetype::{EscalationParams, MAX_ESCALATION_LEVEL};
use crate::entity::Countdown;

#[derive(Debug, Clone, Serialize)]
pub struct WantedLevel {
    level: u8,
    decay: Countdown,
    decay_interval: f32,
}

impl WantedLevel {
    pub fn new(decay_interval: f32) -> Self {
        Self {
            level: 0,
            decay: Countdown::default(),
            decay_interval,
        }
    }

    pub fn from_params(params: &EscalationParams) -> Self {
        Self::new(params.decay_interval)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Time until the next one-level decay
    pub fn decay_remaining(&self) -> f32 {
        self.decay.remaining()
    }

    /// Raise the level, clamped to the maximum, and restart the decay timer
    pub fn add(&mut self, amount: u32) {
        let before = self.level;
        let raised = (self.level as u32).saturating_add(amount);
        self.level = raised.min(MAX_ESCALATION_LEVEL as u32) as u8;
        if self.level > 0 {
            self.decay.set(self.decay_interval);
        }
        if self.level != before {
            tracing::info!(from = before, to = self.level, "Wanted level raised");
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.level == 0 || dt <= 0.0 {
            return;
        }

        // A long dt may cover several decay intervals
        let mut budget = dt;
        while self.level > 0 && budget >= self.decay.remaining() {
            budget -= self.decay.remaining();
            self.level -= 1;
            tracing::info!(to = self.level, "Wanted level decayed");
            if self.level > 0 {
                self.decay.set(self.decay_interval);
            } else {
                self.decay.clear();
            }
        }
        if self.level > 0 {
            self.decay.tick(budget);
        }
    }
}
