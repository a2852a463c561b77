//! Integration tests for spawners and the simulation driver
//!
//! These verify population management end to end:
//! - Escalation gating of the pursuer population
//! - Wanted level decay
//! - Population cap holding under changing escalation
//! - Distance and void culling
//! - Deep-water placement for the aquatic archetype

use glam::Vec3;

use voxel_agents::core::config::SimulationConfig;
use voxel_agents::entity::{Archetype, ArchetypeKind};
use voxel_agents::simulation::{
    DespawnReason, PlayerState, PopulationEvent, Simulation, Spawner, TickContext,
};
use voxel_agents::world::{VoxelMap, VoxelWorld};

/// Dry land east of x = 0, a deep lake west of it
fn shoreline() -> VoxelMap {
    VoxelMap::from_fn((-80, -80), (160, 160), 2, 12, |x, _| if x < 0 { 2 } else { 16 })
}

#[test]
fn test_pursuers_stay_away_without_wanted_level() {
    let world = VoxelMap::new(4, -1);
    let mut sim = Simulation::with_default_archetypes(SimulationConfig::default(), 3);
    let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

    for _ in 0..600 {
        sim.step(0.1, Some(&mut player), &world, &[]);
        assert_eq!(sim.count(ArchetypeKind::Pursuer), 0);
    }
    assert_eq!(sim.wanted_level(), 0);
}

#[test]
fn test_wanted_level_decays_in_sixty_seconds() {
    let world = VoxelMap::new(4, -1);
    let config = SimulationConfig::default();
    let ctx = TickContext::new(&world, &config);
    let mut spawner = Spawner::new(Archetype::pursuer(), 1);

    spawner.add_wanted(5);
    assert_eq!(spawner.wanted_level(), 5);
    for expected in [4, 3, 2, 1, 0] {
        spawner.update(12.0, None, &ctx);
        assert_eq!(spawner.wanted_level(), expected);
    }
}

#[test]
fn test_wanted_level_decays_frame_by_frame() {
    let world = VoxelMap::new(4, -1);
    let mut sim = Simulation::with_default_archetypes(SimulationConfig::default(), 3);
    sim.add_wanted(5);

    // Slightly over 60 s to absorb float drift in the per-frame countdown
    for _ in 0..610 {
        sim.step(0.1, None, &world, &[]);
    }
    assert_eq!(sim.wanted_level(), 0);
}

#[test]
fn test_population_never_exceeds_cap() {
    let world = VoxelMap::new(4, -1);
    let mut sim = Simulation::with_default_archetypes(SimulationConfig::default(), 9);
    let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

    for frame in 0..3000u32 {
        if frame % 400 == 0 {
            sim.add_wanted(2);
        }
        player.position.x = (frame as f32 * 0.01).sin() * 20.0;
        sim.step(0.1, Some(&mut player), &world, &[]);

        for spawner in sim.spawners() {
            assert!(
                spawner.count() <= spawner.current_max_population(),
                "{:?}: {} > {}",
                spawner.kind(),
                spawner.count(),
                spawner.current_max_population()
            );
        }
    }
}

#[test]
fn test_pursuers_spawn_once_wanted() {
    let world = VoxelMap::new(4, -1);
    let mut sim = Simulation::with_default_archetypes(SimulationConfig::default(), 5);
    let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

    sim.add_wanted(3);
    let mut spawned = 0;
    for _ in 0..300 {
        for event in sim.step(0.1, Some(&mut player), &world, &[]) {
            if let PopulationEvent::Spawned { kind: ArchetypeKind::Pursuer, .. } = event {
                spawned += 1;
            }
        }
    }
    assert!(spawned >= 1);
    assert!(sim.count(ArchetypeKind::Pursuer) <= 3);
}

#[test]
fn test_leaving_the_area_despawns_wanderers() {
    let world = VoxelMap::new(4, -1);
    let config = SimulationConfig::default();
    let ctx = TickContext::new(&world, &config);
    let mut spawner = Spawner::new(Archetype::passive_wanderer(), 4);
    let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

    for _ in 0..100 {
        spawner.update(0.1, Some(&mut player), &ctx);
    }
    let before = spawner.count();
    assert!(before > 0);
    let ids: Vec<_> = spawner.agents().iter().map(|a| a.id).collect();

    player.position = Vec3::new(500.5, 5.0, 0.5);
    let events = spawner.update(0.1, Some(&mut player), &ctx);

    for id in ids {
        assert!(spawner.agent(id).is_none());
        assert!(events.contains(&PopulationEvent::Despawned {
            id,
            kind: ArchetypeKind::PassiveWanderer,
            reason: DespawnReason::OutOfRange,
        }));
    }
}

#[test]
fn test_fallen_pursuers_are_removed() {
    // A bottomless pit around the spawn ring
    let world = VoxelMap::new(4, -1);
    let pit = VoxelMap::from_fn((-60, -60), (120, 120), 4, -1, |_, _| -1);
    let config = SimulationConfig::default();
    let mut spawner = Spawner::new(Archetype::pursuer(), 6);
    spawner.add_wanted(5);
    let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

    let land = TickContext::new(&world, &config);
    for _ in 0..5 {
        spawner.try_spawn(player.position, &world);
    }
    assert_eq!(spawner.count(), 5);

    let falling = TickContext::new(&pit, &config);
    let mut fell = 0;
    for _ in 0..40 {
        for event in spawner.update(0.1, Some(&mut player), &falling) {
            if let PopulationEvent::Despawned { reason: DespawnReason::FellOutOfWorld, .. } = event {
                fell += 1;
            }
        }
    }
    assert_eq!(fell, 5);
    assert_eq!(spawner.count(), 0);

    // Back on solid ground the population recovers
    for _ in 0..100 {
        spawner.update(0.1, Some(&mut player), &land);
    }
    assert!(spawner.count() > 0);
}

#[test]
fn test_predators_spawn_only_in_deep_water() {
    let world = shoreline();
    let config = SimulationConfig::default();
    let ctx = TickContext::new(&world, &config);
    let mut spawner = Spawner::new(Archetype::aquatic_predator(), 8);
    let mut player = PlayerState::new(Vec3::new(0.5, 17.0, 0.5));

    let mut sites = Vec::new();
    for _ in 0..1200 {
        for event in spawner.update(0.1, Some(&mut player), &ctx) {
            if let PopulationEvent::Spawned { position, .. } = event {
                sites.push(position);
            }
        }
    }

    assert!(!sites.is_empty());
    for site in sites {
        assert!(site.x < 0.0, "spawned on land at {:?}", site);
        assert!(world.block_at(site).is_liquid());
    }
    assert!(spawner.count() <= 2);
}

#[test]
fn test_archetypes_load_from_data_dir() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/archetypes");
    let sim = Simulation::load(SimulationConfig::default(), &dir, 1).expect("bundled archetypes load");
    assert_eq!(sim.spawners().len(), 3);
    let shark = sim.spawner(ArchetypeKind::AquaticPredator).expect("predator spawner");
    assert_eq!(shark.archetype().combat.damage, 4);
    assert_eq!(shark.current_max_population(), 2);
}
