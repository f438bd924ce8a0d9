//! Offline evaluation harness: run the full decision loop over synthetic
//! worlds and aggregate the outcomes.
//!
//! Nothing here touches a ledger. Worlds are generated from a seed, the
//! autopilot walks them to the origin (or strands), and the per-seed
//! episodes are summarized into a serializable report.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path as FsPath;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::autopilot::Autopilot;
use crate::config::GameConfig;
use crate::geometry::{Position, ORIGIN};
use crate::rng::SeededRng;
use crate::spawn::SpawnOptimizer;
use crate::world::{AgentMarker, Pellet, ShipState, WorldSnapshot};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub seeds: Vec<u64>,
    pub game: GameConfig,
    /// Pellets scattered per synthetic world.
    pub pellet_count: usize,
    /// Half-width of the square field pellets and rivals land in.
    pub field_radius: i64,
    /// Step budget per episode before the walk is abandoned.
    pub max_steps: u64,
    /// Rayon worker override; `None` uses the global pool.
    pub jobs: Option<usize>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            game: GameConfig::default(),
            pellet_count: 120,
            field_radius: 60,
            max_steps: 400,
            jobs: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    pub seed: u64,
    pub spawn_position: Position,
    pub spawn_feasible: bool,
    /// Spawn score when a verified route existed; absent for fallback spawns.
    pub spawn_score: Option<f64>,
    pub reached_origin: bool,
    pub stranded: bool,
    pub steps: u64,
    pub refuels: u64,
    pub final_fuel: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub seed_count: usize,
    pub arrival_rate: f64,
    pub avg_steps: f64,
    pub avg_refuels: f64,
    pub episodes: Vec<EpisodeMetrics>,
}

/// Deterministic synthetic world: pellets and rival ships scattered
/// uniformly over the field.
pub fn generate_world(seed: u64, config: &BenchmarkConfig) -> WorldSnapshot {
    let mut rng = SeededRng::new(seed);
    let span = config.field_radius;
    let mut pellets = Vec::with_capacity(config.pellet_count);
    for index in 0..config.pellet_count {
        let position = Position::new(
            rng.next_range(-span, span + 1),
            rng.next_range(-span, span + 1),
        );
        let fuel = 1 + rng.next_int(config.game.max_fuel as u64) as i64;
        pellets.push(Pellet::new(position, fuel, format!("pellet-{index}")));
    }
    let mut agents = Vec::new();
    for _ in 0..config.pellet_count / 10 {
        agents.push(AgentMarker {
            position: Position::new(
                rng.next_range(-span, span + 1),
                rng.next_range(-span, span + 1),
            ),
        });
    }
    WorldSnapshot::new(pellets, agents)
}

/// One full spawn-and-walk episode over the world for `seed`.
pub fn run_episode(seed: u64, config: &BenchmarkConfig) -> Result<EpisodeMetrics> {
    config.game.validate()?;
    let mut world = generate_world(seed, config);

    let optimizer = SpawnOptimizer::new(config.game);
    let spawn = optimizer
        .find_optimal_spawn(&world)
        .ok_or_else(|| anyhow!("spawn search produced no candidates for seed {seed}"))?;

    let mut pilot = Autopilot::new(config.game);
    let mut ship = ShipState::new(spawn.position, config.game.spawn_fuel);
    let mut steps = 0u64;
    let mut refuels = 0u64;
    let mut stranded = false;

    // Spawning on a pellet cell consumes it like any other arrival.
    if let Some(pellet) = world.pellet_at(ship.position).cloned() {
        ship.refuel(pellet.fuel, config.game.max_fuel);
        world = world.without_pellet(ship.position);
        refuels += 1;
    }

    while steps < config.max_steps {
        let decision = pilot.decide(&world, &ship);
        let Some(step) = decision.step else {
            break; // home
        };
        if step.is_zero() || ship.fuel < config.game.fuel_per_step {
            stranded = true;
            break;
        }

        let next = ship.position.offset(step.dx as i64, step.dy as i64);
        ship.step_to(next, config.game.fuel_per_step)
            .with_context(|| format!("executing planned step at {next} for seed {seed}"))?;
        steps += 1;

        // Mirror the live world: crossing a pellet consumes it.
        if let Some(pellet) = world.pellet_at(ship.position).cloned() {
            ship.refuel(pellet.fuel, config.game.max_fuel);
            world = world.without_pellet(ship.position);
            refuels += 1;
        }
    }

    Ok(EpisodeMetrics {
        seed,
        spawn_position: spawn.position,
        spawn_feasible: spawn.feasible,
        spawn_score: spawn.feasible.then_some(spawn.score),
        reached_origin: ship.position == ORIGIN,
        stranded,
        steps,
        refuels,
        final_fuel: ship.fuel,
    })
}

/// Runs every seed in parallel and aggregates.
pub fn run_benchmark(config: &BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }

    let run_one = |seed: &u64| run_episode(*seed, config);
    let results: Vec<Result<EpisodeMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut episodes = Vec::with_capacity(results.len());
    for result in results {
        episodes.push(result?);
    }

    let count = episodes.len();
    let arrivals = episodes.iter().filter(|e| e.reached_origin).count();
    let total_steps: u64 = episodes.iter().map(|e| e.steps).sum();
    let total_refuels: u64 = episodes.iter().map(|e| e.refuels).sum();

    Ok(BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
        seed_count: count,
        arrival_rate: arrivals as f64 / count as f64,
        avg_steps: total_steps as f64 / count as f64,
        avg_refuels: total_refuels as f64 / count as f64,
        episodes,
    })
}

/// Serializes the report as pretty JSON, creating parent directories.
pub fn write_report(path: &FsPath, report: &BenchmarkReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(report).context("serializing benchmark report")?;
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}
