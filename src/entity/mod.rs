pub mod agent;
pub mod archetype;
pub mod timers;

pub use agent::{Agent, AgentTimers, AgentView, AiState};
pub use archetype::{
    load_archetype, load_archetype_from, Archetype, ArchetypeKind, BehaviorFlags, BlockedPolicy,
    PopulationCap, VoidPolicy,
};
pub use timers::Countdown;
