//! Voxel Agents - Headless Runner
//!
//! Runs the agent kernel over a demo terrain with a scripted player walking a
//! loop around a lake, and prints a population summary.

use std::f32::consts::TAU;
use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use voxel_agents::core::config::SimulationConfig;
use voxel_agents::core::error::Result;
use voxel_agents::simulation::{
    DespawnReason, PlayerState, PopulationEvent, Simulation, SimulationSnapshot,
};
use voxel_agents::world::{VoxelMap, VoxelWorld, DEFAULT_WATER_LEVEL};

/// Headless Voxel Agents runner
#[derive(Parser, Debug)]
#[command(name = "voxel-agents")]
#[command(about = "Run the NPC kernel headless and report populations")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Frame delta in seconds (clamped by the config)
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Wanted level reported at start
    #[arg(long, default_value_t = 0)]
    wanted: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Directory holding simulation.toml and archetypes/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: u64,
    player_health: i32,
    hits_taken: u32,
    spawned: usize,
    killed: usize,
    fell_out_of_world: usize,
    out_of_range: usize,
    over_capacity: usize,
    snapshot: SimulationSnapshot,
}

/// Half-extent of the generated demo terrain
const TERRAIN_RADIUS: i32 = 96;
/// Radius of the player's walking loop
const WALK_RADIUS: f32 = 30.0;
/// Seconds per walking loop
const WALK_PERIOD: f32 = 90.0;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voxel_agents=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = load_config(&args)?;
    let mut sim = match Simulation::load(config.clone(), &args.data_dir.join("archetypes"), seed) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::warn!("Failed to load archetypes from {:?}: {}", args.data_dir, e);
            tracing::warn!("Using built-in archetypes");
            Simulation::with_default_archetypes(config, seed)
        }
    };
    sim.add_wanted(args.wanted);

    let world = demo_terrain();
    let mut player = PlayerState::new(walk_position(&world, 0.0));
    let mut report = RunReport {
        seed,
        player_health: 0,
        hits_taken: 0,
        spawned: 0,
        killed: 0,
        fell_out_of_world: 0,
        out_of_range: 0,
        over_capacity: 0,
        snapshot: sim.snapshot(),
    };

    tracing::info!(seed, seconds = args.seconds, "Run started");
    let frames = frame_count(args.seconds, args.dt, &sim.config);
    for _ in 0..frames {
        let t = sim.elapsed();
        player.position = walk_position(&world, t);
        player.sync_with_world(&world);

        // A cart trailing the player scares wanderers off the path
        let hazards = [walk_position(&world, t - 2.0)];
        for event in sim.step(args.dt, Some(&mut player), &world, &hazards) {
            tally(&mut report, &event);
        }
    }

    report.player_health = player.health;
    report.hits_taken = player.hits_taken;
    report.snapshot = sim.snapshot();

    match args.format.as_str() {
        "text" => print_text(&report),
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let path = args.data_dir.join("simulation.toml");
    if path.exists() {
        SimulationConfig::load(&path)
    } else {
        tracing::warn!("No config at {:?}, using defaults", path);
        Ok(SimulationConfig::default())
    }
}

/// Frames needed to cover `seconds` at the step size the simulation will
/// actually take
fn frame_count(seconds: f32, dt: f32, config: &SimulationConfig) -> u64 {
    let step = config.clamp_dt(dt);
    if step <= 0.0 {
        tracing::warn!(dt, "Frame delta clamps to zero, nothing to run");
        return 0;
    }
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds / step).ceil() as u64
}

/// Rolling hills with a deep lake west of the origin
fn demo_terrain() -> VoxelMap {
    let water = DEFAULT_WATER_LEVEL;
    let size = (TERRAIN_RADIUS * 2) as u32;
    VoxelMap::from_fn((-TERRAIN_RADIUS, -TERRAIN_RADIUS), (size, size), water + 2, water, |x, z| {
        let (fx, fz) = (x as f32, z as f32);
        let lake = Vec3::new(fx + 30.0, 0.0, fz).length();
        if lake < 18.0 {
            return water - 8 + (lake / 6.0) as i32;
        }
        let hills = (fx * 0.07).sin() * 3.0 + (fz * 0.05).cos() * 2.0;
        water + 3 + hills.round() as i32
    })
}

/// Player position on the walking loop at time `t`
fn walk_position(world: &dyn VoxelWorld, t: f32) -> Vec3 {
    let angle = t / WALK_PERIOD * TAU;
    let x = angle.cos() * WALK_RADIUS;
    let z = angle.sin() * WALK_RADIUS;
    let ground = world.spawn_height(x.floor() as i32, z.floor() as i32);
    let y = (ground as f32 + 1.0).max(world.water_surface() - 1.0);
    Vec3::new(x, y, z)
}

fn tally(report: &mut RunReport, event: &PopulationEvent) {
    match event {
        PopulationEvent::Spawned { .. } => report.spawned += 1,
        PopulationEvent::Despawned { reason, .. } => match reason {
            DespawnReason::Killed => report.killed += 1,
            DespawnReason::FellOutOfWorld => report.fell_out_of_world += 1,
            DespawnReason::OutOfRange => report.out_of_range += 1,
            DespawnReason::OverCapacity => report.over_capacity += 1,
        },
    }
}

fn print_text(report: &RunReport) {
    let snapshot = &report.snapshot;
    println!("=== Voxel Agents ===");
    println!("Seed: {}", report.seed);
    println!(
        "Ticks: {}  Elapsed: {:.1}s  Wanted: {}",
        snapshot.tick, snapshot.elapsed, snapshot.wanted_level
    );
    println!(
        "Player health: {}  Hits taken: {}",
        report.player_health, report.hits_taken
    );
    println!();
    println!("Populations:");
    for population in &snapshot.populations {
        println!("  {:?}: {}/{}", population.kind, population.count, population.cap);
    }
    println!();
    println!(
        "Spawned: {}  Killed: {}  Fell: {}  Out of range: {}  Over capacity: {}",
        report.spawned, report.killed, report.fell_out_of_world, report.out_of_range, report.over_capacity
    );
    for agent in &snapshot.agents {
        println!(
            "  {} {:?} at ({:.1}, {:.1}, {:.1}) {:?} hp={}",
            agent.id, agent.kind, agent.position.x, agent.position.y, agent.position.z, agent.state, agent.health
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_uses_clamped_dt() {
        let config = SimulationConfig::default();
        // 0.5 s frames are clamped to 0.1 s, so 60 s still takes 600 steps
        assert_eq!(frame_count(60.0, 0.5, &config), 600);
        assert_eq!(frame_count(1.0, 0.05, &config), 20);
    }

    #[test]
    fn test_frame_count_zero_dt_runs_nothing() {
        let config = SimulationConfig::default();
        assert_eq!(frame_count(60.0, 0.0, &config), 0);
        assert_eq!(frame_count(60.0, -1.0, &config), 0);
        assert_eq!(frame_count(60.0, f32::NAN, &config), 0);
        assert_eq!(frame_count(0.0, 0.1, &config), 0);
    }
}
