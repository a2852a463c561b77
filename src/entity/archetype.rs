//! Archetype descriptors
//!
//! One kernel drives every agent; an [`Archetype`] supplies the numbers and
//! the small strategy values (void policy, blocked-axis policy, flee and
//! special-idle parameters) that distinguish one kind of NPC from another.
//! Descriptors load from `data/archetypes/{name}.toml` or come from the
//! built-in constructors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::world::BlockMaterial;

/// Highest escalation level any table is keyed by
pub const MAX_ESCALATION_LEVEL: u8 = 5;

/// Which kind of NPC a descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    /// Law enforcement; appears and hunts only while the wanted level is raised
    Pursuer,
    /// Ambush hunter confined to deep water
    AquaticPredator,
    /// Harmless roamer that flees hazards
    PassiveWanderer,
}

impl ArchetypeKind {
    pub const ALL: [ArchetypeKind; 3] = [
        ArchetypeKind::Pursuer,
        ArchetypeKind::AquaticPredator,
        ArchetypeKind::PassiveWanderer,
    ];

    /// File stem used for the data file
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Pursuer => "pursuer",
            Self::AquaticPredator => "aquatic_predator",
            Self::PassiveWanderer => "passive_wanderer",
        }
    }
}

/// Behavior flag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorFlags {
    pub can_flee: bool,
    pub always_aggressive: bool,
    /// Aggressive only while the owning spawner's escalation level is > 0
    pub escalation_gated: bool,
    pub has_special_idle: bool,
    /// Water-bound swimmer: deep-water spawns, 3D chase, submerged prey only
    pub aquatic: bool,
}

/// Collision box dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyShape {
    /// Half the horizontal extent of the sampling box
    pub half_width: f32,
    pub height: f32,
}

/// Submerged vertical/horizontal tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaterParams {
    /// Downward pull while submerged (units/s²)
    pub sink_force: f32,
    /// Upward force at full submersion (units/s²)
    pub buoyancy: f32,
    /// Depth below the surface at which the submersion ratio reaches 1
    pub submersion_depth: f32,
    /// Per-tick damping of vertical velocity
    pub vertical_friction: f32,
    /// Per-tick damping of horizontal velocity
    pub horizontal_friction: f32,
    /// Vertical speed clamp while submerged (symmetric)
    pub max_vertical_speed: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionParams {
    pub gravity: f32,
    /// Most negative vertical speed in air
    pub terminal_velocity: f32,
    /// Upward impulse applied when a chasing agent is blocked on the ground
    pub jump_speed: f32,
    pub water: WaterParams,
}

/// A multiplier that applies from `min_level` upwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMultiplier {
    pub min_level: u8,
    pub multiplier: f32,
}

/// Discrete tier lookup: the entry with the highest `min_level <= level`, else 1.0
pub fn tier_multiplier(tiers: &[TierMultiplier], level: u8) -> f32 {
    tiers
        .iter()
        .filter(|t| level >= t.min_level)
        .max_by_key(|t| t.min_level)
        .map(|t| t.multiplier)
        .unwrap_or(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatParams {
    pub detection_range: f32,
    pub attack_range: f32,
    /// Seconds between hits
    pub attack_interval: f32,
    pub damage: i32,
    #[serde(default)]
    pub chase_speed_tiers: Vec<TierMultiplier>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WanderParams {
    /// Fraction of base speed used while wandering
    pub speed_fraction: f32,
    pub hold_min: f32,
    pub hold_max: f32,
    /// Shorter hold used after a blocked re-roll
    pub blocked_hold_min: f32,
    pub blocked_hold_max: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleeParams {
    pub trigger_radius: f32,
    pub speed_multiplier: f32,
    /// Seconds a flee keeps going after the last trigger
    pub duration: f32,
    /// Treat the player itself as a threat
    pub include_player: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialIdleParams {
    pub interval_min: f32,
    pub interval_max: f32,
    /// Seconds spent stationary
    pub duration: f32,
}

/// What happens when an agent drops below the void floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VoidPolicy {
    /// Die on the spot; the spawner removes it the same tick
    Despawn,
    /// Reset to a fixed altitude above the same column
    Teleport { altitude: f32 },
}

/// Reaction to a horizontal axis being blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedPolicy {
    /// Pick a new wander direction with a short hold
    Reroll,
    /// Jump when grounded and chasing, otherwise re-roll
    JumpWhenChasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PopulationCap {
    Fixed { max: usize },
    /// Cap read from the escalation table
    Escalation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationParams {
    /// Seconds per one-level decay
    pub decay_interval: f32,
    /// Population cap indexed by level 0..=5
    pub population_by_level: [usize; 6],
    #[serde(default)]
    pub spawn_interval_tiers: Vec<TierMultiplier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRules {
    /// Seconds between spawn attempts
    pub interval: f32,
    pub ring_min: f32,
    pub ring_max: f32,
    pub despawn_radius: f32,
    /// Despawn radius for agents chasing or attacking
    pub engaged_despawn_radius: f32,
    pub cap: PopulationCap,
    /// Ground must be at least this many blocks above the water level
    #[serde(default)]
    pub min_ground_above_water: i32,
    /// Aquatic only: water blocks required below the surface
    #[serde(default)]
    pub min_water_depth: i32,
    /// Aquatic only: spawn this far below the surface
    #[serde(default)]
    pub spawn_depth: f32,
}

/// Complete descriptor for one kind of NPC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    /// Name of this archetype (set from filename)
    #[serde(default)]
    pub name: String,
    pub kind: ArchetypeKind,
    pub max_health: i32,
    pub base_speed: f32,
    #[serde(default)]
    pub flags: BehaviorFlags,
    pub body: BodyShape,
    pub motion: MotionParams,
    pub combat: CombatParams,
    pub wander: WanderParams,
    #[serde(default)]
    pub flee: FleeParams,
    #[serde(default)]
    pub special_idle: SpecialIdleParams,
    /// Gas-like blocks this archetype moves through
    #[serde(default)]
    pub passable: Vec<BlockMaterial>,
    pub void_policy: VoidPolicy,
    pub blocked_policy: BlockedPolicy,
    pub spawn: SpawnRules,
    #[serde(default)]
    pub escalation: Option<EscalationParams>,
}

impl Archetype {
    /// Built-in descriptor for a kind
    pub fn builtin(kind: ArchetypeKind) -> Self {
        match kind {
            ArchetypeKind::Pursuer => Self::pursuer(),
            ArchetypeKind::AquaticPredator => Self::aquatic_predator(),
            ArchetypeKind::PassiveWanderer => Self::passive_wanderer(),
        }
    }

    pub fn pursuer() -> Self {
        Self {
            name: "pursuer".into(),
            kind: ArchetypeKind::Pursuer,
            max_health: 20,
            base_speed: 4.5,
            flags: BehaviorFlags {
                escalation_gated: true,
                ..BehaviorFlags::default()
            },
            body: BodyShape { half_width: 0.3, height: 1.8 },
            motion: MotionParams {
                gravity: 25.0,
                terminal_velocity: -50.0,
                jump_speed: 8.5,
                water: WaterParams {
                    sink_force: 8.0,
                    buoyancy: 12.0,
                    submersion_depth: 1.5,
                    vertical_friction: 0.9,
                    horizontal_friction: 0.85,
                    max_vertical_speed: 4.0,
                },
            },
            combat: CombatParams {
                detection_range: 40.0,
                attack_range: 2.0,
                attack_interval: 1.0,
                damage: 2,
                chase_speed_tiers: vec![
                    TierMultiplier { min_level: 2, multiplier: 1.2 },
                    TierMultiplier { min_level: 3, multiplier: 1.4 },
                ],
            },
            wander: WanderParams {
                speed_fraction: 0.3,
                hold_min: 3.0,
                hold_max: 8.0,
                blocked_hold_min: 0.5,
                blocked_hold_max: 1.5,
            },
            flee: FleeParams::default(),
            special_idle: SpecialIdleParams::default(),
            passable: Vec::new(),
            void_policy: VoidPolicy::Despawn,
            blocked_policy: BlockedPolicy::JumpWhenChasing,
            spawn: SpawnRules {
                interval: 5.0,
                ring_min: 25.0,
                ring_max: 45.0,
                despawn_radius: 80.0,
                engaged_despawn_radius: 140.0,
                cap: PopulationCap::Escalation,
                min_ground_above_water: 1,
                min_water_depth: 0,
                spawn_depth: 0.0,
            },
            escalation: Some(EscalationParams {
                decay_interval: 12.0,
                population_by_level: [0, 1, 2, 3, 4, 5],
                spawn_interval_tiers: vec![
                    TierMultiplier { min_level: 2, multiplier: 0.8 },
                    TierMultiplier { min_level: 3, multiplier: 0.6 },
                    TierMultiplier { min_level: 5, multiplier: 0.4 },
                ],
            }),
        }
    }

    pub fn aquatic_predator() -> Self {
        Self {
            name: "aquatic_predator".into(),
            kind: ArchetypeKind::AquaticPredator,
            max_health: 30,
            base_speed: 5.0,
            flags: BehaviorFlags {
                always_aggressive: true,
                aquatic: true,
                ..BehaviorFlags::default()
            },
            body: BodyShape { half_width: 0.4, height: 0.8 },
            motion: MotionParams {
                gravity: 25.0,
                terminal_velocity: -50.0,
                jump_speed: 0.0,
                water: WaterParams {
                    sink_force: 6.0,
                    buoyancy: 10.0,
                    submersion_depth: 2.0,
                    vertical_friction: 0.92,
                    horizontal_friction: 0.92,
                    max_vertical_speed: 4.0,
                },
            },
            combat: CombatParams {
                detection_range: 24.0,
                attack_range: 2.5,
                attack_interval: 1.8,
                damage: 4,
                chase_speed_tiers: Vec::new(),
            },
            wander: WanderParams {
                speed_fraction: 0.25,
                hold_min: 4.0,
                hold_max: 8.0,
                blocked_hold_min: 0.5,
                blocked_hold_max: 1.5,
            },
            flee: FleeParams::default(),
            special_idle: SpecialIdleParams::default(),
            passable: Vec::new(),
            void_policy: VoidPolicy::Despawn,
            blocked_policy: BlockedPolicy::Reroll,
            spawn: SpawnRules {
                interval: 8.0,
                ring_min: 20.0,
                ring_max: 40.0,
                despawn_radius: 70.0,
                engaged_despawn_radius: 110.0,
                cap: PopulationCap::Fixed { max: 2 },
                min_ground_above_water: 0,
                min_water_depth: 4,
                spawn_depth: 2.5,
            },
            escalation: None,
        }
    }

    pub fn passive_wanderer() -> Self {
        Self {
            name: "passive_wanderer".into(),
            kind: ArchetypeKind::PassiveWanderer,
            max_health: 10,
            base_speed: 2.5,
            flags: BehaviorFlags {
                can_flee: true,
                has_special_idle: true,
                ..BehaviorFlags::default()
            },
            body: BodyShape { half_width: 0.3, height: 1.6 },
            motion: MotionParams {
                gravity: 25.0,
                terminal_velocity: -50.0,
                jump_speed: 0.0,
                water: WaterParams {
                    sink_force: 8.0,
                    buoyancy: 14.0,
                    submersion_depth: 1.2,
                    vertical_friction: 0.9,
                    horizontal_friction: 0.88,
                    max_vertical_speed: 4.0,
                },
            },
            combat: CombatParams {
                detection_range: 0.0,
                attack_range: 0.0,
                attack_interval: 1.0,
                damage: 0,
                chase_speed_tiers: Vec::new(),
            },
            wander: WanderParams {
                speed_fraction: 0.28,
                hold_min: 3.0,
                hold_max: 8.0,
                blocked_hold_min: 0.5,
                blocked_hold_max: 1.5,
            },
            flee: FleeParams {
                trigger_radius: 8.0,
                speed_multiplier: 2.2,
                duration: 2.0,
                include_player: false,
            },
            special_idle: SpecialIdleParams {
                interval_min: 10.0,
                interval_max: 20.0,
                duration: 3.0,
            },
            passable: vec![BlockMaterial::Cloud, BlockMaterial::Leaves],
            void_policy: VoidPolicy::Teleport { altitude: 80.0 },
            blocked_policy: BlockedPolicy::Reroll,
            spawn: SpawnRules {
                interval: 3.0,
                ring_min: 20.0,
                ring_max: 40.0,
                despawn_radius: 70.0,
                engaged_despawn_radius: 70.0,
                cap: PopulationCap::Fixed { max: 6 },
                min_ground_above_water: 1,
                min_water_depth: 0,
                spawn_depth: 0.0,
            },
            escalation: None,
        }
    }

    /// Does this block stop this archetype?
    pub fn blocks_movement(&self, block: BlockMaterial) -> bool {
        block.is_solid() && !self.passable.contains(&block)
    }

    /// Chase speed multiplier for an escalation level
    pub fn chase_multiplier(&self, level: u8) -> f32 {
        tier_multiplier(&self.combat.chase_speed_tiers, level)
    }

    /// Spawn interval multiplier for an escalation level
    pub fn spawn_interval_multiplier(&self, level: u8) -> f32 {
        self.escalation
            .as_ref()
            .map(|e| tier_multiplier(&e.spawn_interval_tiers, level))
            .unwrap_or(1.0)
    }

    /// Population cap for an escalation level
    pub fn population_cap(&self, level: u8) -> usize {
        match self.spawn.cap {
            PopulationCap::Fixed { max } => max,
            PopulationCap::Escalation => self
                .escalation
                .as_ref()
                .map(|e| e.population_by_level[level.min(MAX_ESCALATION_LEVEL) as usize])
                .unwrap_or(0),
        }
    }

    /// Check ranges, ring ordering and flag/parameter consistency
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(SimError::InvalidArchetype {
                name: self.name.clone(),
                reason,
            })
        };

        if self.max_health <= 0 || self.base_speed <= 0.0 {
            return fail("max_health and base_speed must be positive".into());
        }
        if self.body.half_width <= 0.0 || self.body.height <= 0.0 {
            return fail("body dimensions must be positive".into());
        }

        let water = &self.motion.water;
        for (label, f) in [
            ("vertical_friction", water.vertical_friction),
            ("horizontal_friction", water.horizontal_friction),
        ] {
            if !(f > 0.0 && f <= 1.0) {
                return fail(format!("{} ({}) must be within (0, 1]", label, f));
            }
        }
        if water.submersion_depth <= 0.0 {
            return fail("submersion_depth must be positive".into());
        }

        if self.wander.hold_min > self.wander.hold_max
            || self.wander.blocked_hold_min > self.wander.blocked_hold_max
        {
            return fail("wander hold ranges must have min <= max".into());
        }

        let spawn = &self.spawn;
        if spawn.ring_min >= spawn.ring_max {
            return fail(format!(
                "ring_min ({}) should be < ring_max ({})",
                spawn.ring_min, spawn.ring_max
            ));
        }
        if spawn.despawn_radius <= spawn.ring_max {
            return fail(format!(
                "despawn_radius ({}) should be > ring_max ({})",
                spawn.despawn_radius, spawn.ring_max
            ));
        }
        if spawn.engaged_despawn_radius < spawn.despawn_radius {
            return fail("engaged_despawn_radius must be >= despawn_radius".into());
        }
        if spawn.interval <= 0.0 {
            return fail("spawn interval must be positive".into());
        }

        if self.flags.always_aggressive || self.flags.escalation_gated {
            if self.combat.attack_range > self.combat.detection_range {
                return fail("attack_range must not exceed detection_range".into());
            }
            if self.combat.attack_interval <= 0.0 {
                return fail("attack_interval must be positive".into());
            }
        }

        if self.flags.can_flee && (self.flee.trigger_radius <= 0.0 || self.flee.duration <= 0.0) {
            return fail("can_flee requires a positive flee trigger_radius and duration".into());
        }

        if self.flags.has_special_idle
            && (self.special_idle.duration <= 0.0
                || self.special_idle.interval_min > self.special_idle.interval_max)
        {
            return fail("has_special_idle requires a positive duration and ordered interval".into());
        }

        let escalation_cap = matches!(spawn.cap, PopulationCap::Escalation);
        if self.flags.escalation_gated != escalation_cap || escalation_cap != self.escalation.is_some() {
            return fail("escalation_gated, an escalation cap and escalation params go together".into());
        }
        if let Some(escalation) = &self.escalation {
            if escalation.decay_interval <= 0.0 {
                return fail("decay_interval must be positive".into());
            }
        }

        if self.flags.aquatic && spawn.min_water_depth <= 0 {
            return fail("aquatic archetypes need a positive min_water_depth".into());
        }

        Ok(())
    }
}

/// Load archetype from TOML file
///
/// Loads from `data/archetypes/{name}.toml`
pub fn load_archetype(name: &str) -> Result<Archetype> {
    load_archetype_from(Path::new("data/archetypes"), name)
}

/// Load archetype from `{dir}/{name}.toml`
pub fn load_archetype_from(dir: &Path, name: &str) -> Result<Archetype> {
    let path = archetype_path(dir, name);
    if !path.exists() {
        return Err(SimError::ArchetypeNotFound(name.to_string()));
    }

    let contents = fs::read_to_string(&path)?;
    let mut archetype: Archetype = toml::from_str(&contents)?;
    archetype.name = name.to_string();
    archetype.validate()?;
    Ok(archetype)
}

fn archetype_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.toml", name))
}
