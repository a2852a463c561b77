//! Per-tick systems: AI steering, physics, escalation and population
//! management, plus the driver that runs them each frame.

pub mod ai;
pub mod context;
pub mod escalation;
pub mod physics;
pub mod spawner;
pub mod tick;

pub use context::{PlayerState, PlayerTarget, TickContext};
pub use escalation::WantedLevel;
pub use physics::MoveOutcome;
pub use spawner::{DespawnReason, PopulationEvent, Spawner};
pub use tick::{PopulationSummary, Simulation, SimulationSnapshot};
