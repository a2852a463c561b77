//! Property tests for kernel invariants

use std::sync::Arc;

use glam::Vec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use voxel_agents::core::config::SimulationConfig;
use voxel_agents::entity::{Agent, Archetype, ArchetypeKind};
use voxel_agents::simulation::physics;
use voxel_agents::simulation::{PlayerState, Simulation, TickContext, WantedLevel};
use voxel_agents::world::{BlockMaterial, VoxelMap};

fn archetype_strategy() -> impl Strategy<Value = ArchetypeKind> {
    prop_oneof![
        Just(ArchetypeKind::Pursuer),
        Just(ArchetypeKind::AquaticPredator),
        Just(ArchetypeKind::PassiveWanderer),
    ]
}

proptest! {
    #[test]
    fn wanted_level_stays_in_range(
        steps in prop::collection::vec((0u32..8, 0.0f32..20.0), 0..50)
    ) {
        let mut wanted = WantedLevel::new(12.0);
        for (amount, dt) in steps {
            wanted.add(amount);
            prop_assert!(wanted.level() <= 5);
            wanted.tick(dt);
            prop_assert!(wanted.level() <= 5);
        }
    }

    #[test]
    fn population_never_exceeds_cap(
        seed in any::<u64>(),
        frames in prop::collection::vec((0.0f32..0.3, 0u32..3, -30.0f32..30.0), 1..300)
    ) {
        let world = VoxelMap::new(4, -1);
        let mut sim = Simulation::with_default_archetypes(SimulationConfig::default(), seed);
        let mut player = PlayerState::new(Vec3::new(0.5, 5.0, 0.5));

        for (dt, wanted, x) in frames {
            sim.add_wanted(wanted);
            player.position.x = x;
            sim.step(dt, Some(&mut player), &world, &[]);
            for spawner in sim.spawners() {
                prop_assert!(spawner.count() <= spawner.current_max_population());
            }
        }
    }

    #[test]
    fn blocked_x_move_keeps_x(
        vx in 5.0f32..40.0,
        vy in -40.0f32..40.0,
        dt in 0.04f32..0.1,
        z in 0.35f32..0.65,
        vz in -3.0f32..3.0,
        kind in archetype_strategy(),
    ) {
        // Wall from x = 1 up to well above head height, low ceiling over the start
        let mut world = VoxelMap::from_fn((1, -20), (12, 40), 4, -1, |_, _| 12);
        world.fill((-2, 8, -2), (0, 8, 2), BlockMaterial::Stone);
        let config = SimulationConfig::default();
        let ctx = TickContext::new(&world, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut agent = Agent::new(Vec3::new(0.5, 5.001, z), Arc::new(Archetype::builtin(kind)), &mut rng);
        agent.velocity = Vec3::new(vx, vy, vz);
        let outcome = physics::integrate(&mut agent, dt, &ctx);

        prop_assert!(outcome.blocked_x);
        prop_assert_eq!(agent.position.x, 0.5);
    }

    #[test]
    fn zero_dt_is_idempotent(
        kind in archetype_strategy(),
        x in -20.0f32..20.0,
        y in -5.0f32..30.0,
        z in -20.0f32..20.0,
        vy in -30.0f32..30.0,
        escalation in 0u8..=5,
    ) {
        let world = VoxelMap::new(4, 12);
        let config = SimulationConfig::default();
        let ctx = TickContext::new(&world, &config).with_escalation(escalation);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = PlayerState::new(Vec3::new(x + 1.0, y, z));
        player.sync_with_world(&world);

        let mut agent = Agent::new(Vec3::new(x, y, z), Arc::new(Archetype::builtin(kind)), &mut rng);
        agent.velocity.y = vy;
        let before = agent.clone();
        agent.update(0.0, Some(&mut player), &ctx, &mut rng);

        prop_assert_eq!(agent.position, before.position);
        prop_assert_eq!(agent.velocity, before.velocity);
        prop_assert_eq!(agent.timers, before.timers);
        prop_assert_eq!(agent.state, before.state);
        prop_assert_eq!(player.hits_taken, 0);
    }

    #[test]
    fn nothing_stays_alive_below_the_floor(
        kind in archetype_strategy(),
        y in -9.5f32..20.0,
        vy in -50.0f32..0.0,
        dts in prop::collection::vec(0.0f32..0.1, 1..80),
    ) {
        let world = VoxelMap::from_fn((-40, -40), (80, 80), 4, -1, |_, _| -1);
        let config = SimulationConfig::default();
        let ctx = TickContext::new(&world, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut agent = Agent::new(Vec3::new(0.5, y, 0.5), Arc::new(Archetype::builtin(kind)), &mut rng);
        agent.velocity.y = vy;
        for dt in dts {
            agent.update(dt, None, &ctx, &mut rng);
            prop_assert!(!(agent.alive && agent.position.y < config.void_floor));
        }
    }
}
