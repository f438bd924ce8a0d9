//! Spawn-position search: generate candidate start cells, score them, pick
//! the best.
//!
//! Candidate quality is dominated by feasibility: a start the route planner
//! can actually bring home outranks everything else, and only then do
//! efficiency, refueling safety, pellet density, distance and crowding pull
//! the ranking apart. When nothing is feasible anywhere, the optimizer still
//! returns its best guess (most pellets nearby) with the feasibility flag
//! down so the caller knows the route is unverified.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::geometry::{manhattan, Position, ORIGIN};
use crate::pathfinder::{Path, Pathfinder};
use crate::world::WorldSnapshot;

/// Weights and sampling parameters for the spawn search.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SpawnConfig {
    /// Flat reward for any candidate with a verified route home.
    pub feasible_reward: f64,
    /// Weight on path efficiency (direct distance / actual cost, capped 1).
    pub efficiency_weight: f64,
    /// Weight on refueling safety (fuel stops / 3, capped 1).
    pub safety_weight: f64,
    /// Weight on pellet density (pellets within the radius / 10, capped 1).
    pub density_weight: f64,
    /// Radius of the pellet-density neighborhood.
    pub density_radius: i64,
    /// Penalty per unit of distance from the origin.
    pub distance_penalty: f64,
    /// Penalty per rival ship within the crowding radius (counted up to 3).
    pub crowding_penalty: f64,
    pub crowding_radius: i64,
    /// Spacing of the systematic grid strategy.
    pub grid_spacing: i64,
    /// Extra search depth beyond the minimum spawn distance.
    pub search_margin: i64,
    /// Angular samples per radial ring.
    pub radial_samples: usize,
    /// Radial rings between the minimum and maximum search radius.
    pub radial_rings: usize,
    /// Early stop: this many feasible candidates found...
    pub early_feasible: usize,
    /// ...and at least this many candidates evaluated.
    pub early_evaluated: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            feasible_reward: 1000.0,
            efficiency_weight: 100.0,
            safety_weight: 50.0,
            density_weight: 30.0,
            density_radius: 20,
            distance_penalty: 0.1,
            crowding_penalty: 20.0,
            crowding_radius: 15,
            grid_spacing: 10,
            search_margin: 40,
            radial_samples: 16,
            radial_rings: 3,
            early_feasible: 10,
            early_evaluated: 100,
        }
    }
}

/// One evaluated start position.
#[derive(Clone, Debug, Serialize)]
pub struct SpawnCandidate {
    pub position: Position,
    /// Composite score; `f64::NEG_INFINITY` when no route was verified.
    pub score: f64,
    pub feasible: bool,
    /// The verified route home, when one exists.
    pub path: Option<Path>,
    /// Pellets within the density radius.
    pub nearby_pellets: usize,
    /// Step count of the verified route (0 when infeasible).
    pub total_moves: u64,
}

pub struct SpawnOptimizer {
    config: GameConfig,
    spawn: SpawnConfig,
    pathfinder: Pathfinder,
}

impl SpawnOptimizer {
    pub fn new(config: GameConfig) -> Self {
        Self::with_spawn_config(config, SpawnConfig::default())
    }

    pub fn with_spawn_config(config: GameConfig, spawn: SpawnConfig) -> Self {
        Self {
            config,
            spawn,
            pathfinder: Pathfinder::new(config),
        }
    }

    /// Best start cell for the current world, or `None` when the search
    /// radius admits no candidate at all.
    pub fn find_optimal_spawn(&self, world: &WorldSnapshot) -> Option<SpawnCandidate> {
        let candidates = self.generate_candidates(world);
        debug!(candidates = candidates.len(), "spawn candidate set built");
        if candidates.is_empty() {
            return None;
        }

        let mut best: Option<SpawnCandidate> = None;
        let mut best_fallback: Option<SpawnCandidate> = None;
        let mut feasible_found = 0usize;
        let mut evaluated = 0usize;

        for position in candidates {
            let candidate = self.evaluate(world, position);
            evaluated += 1;

            if candidate.feasible {
                feasible_found += 1;
                if best
                    .as_ref()
                    .is_none_or(|seen| candidate.score > seen.score)
                {
                    best = Some(candidate);
                }
            } else if best_fallback
                .as_ref()
                .is_none_or(|seen| candidate.nearby_pellets > seen.nearby_pellets)
            {
                best_fallback = Some(candidate);
            }

            // Latency/quality tradeoff, not a correctness requirement.
            if feasible_found >= self.spawn.early_feasible
                && evaluated >= self.spawn.early_evaluated
            {
                debug!(evaluated, feasible_found, "early spawn-search stop");
                break;
            }
        }

        match best {
            Some(candidate) => {
                info!(
                    position = %candidate.position,
                    score = candidate.score,
                    moves = candidate.total_moves,
                    "spawn selected with verified route"
                );
                Some(candidate)
            }
            None => {
                info!(evaluated, "no feasible spawn found, falling back to pellet density");
                best_fallback
            }
        }
    }

    /// Scores one candidate by planning a full route home from it.
    fn evaluate(&self, world: &WorldSnapshot, position: Position) -> SpawnCandidate {
        let path =
            self.pathfinder
                .find_path_with_refueling(world, position, ORIGIN, self.config.spawn_fuel);
        let nearby_pellets = world
            .pellets_within(position, self.spawn.density_radius)
            .len();

        if !path.success {
            return SpawnCandidate {
                position,
                score: f64::NEG_INFINITY,
                feasible: false,
                path: None,
                nearby_pellets,
                total_moves: 0,
            };
        }

        let direct = manhattan(position, ORIGIN);
        let efficiency = if path.cost == 0 {
            1.0
        } else {
            (direct as f64 / path.cost as f64).min(1.0)
        };
        let safety = (path.fuel_stops.len() as f64 / 3.0).min(1.0);
        let density = (nearby_pellets as f64 / 10.0).min(1.0);
        let crowding = world
            .agents()
            .iter()
            .filter(|agent| manhattan(agent.position, position) <= self.spawn.crowding_radius)
            .count()
            .min(3);

        let score = self.spawn.feasible_reward
            + self.spawn.efficiency_weight * efficiency
            + self.spawn.safety_weight * safety
            + self.spawn.density_weight * density
            - self.spawn.distance_penalty * direct as f64
            - self.spawn.crowding_penalty * crowding as f64;

        let total_moves = path.cost;
        SpawnCandidate {
            position,
            score,
            feasible: true,
            path: Some(path),
            nearby_pellets,
            total_moves,
        }
    }

    /// Three complementary sampling strategies, deduplicated by cell in
    /// first-seen order: pellet-chain neighborhoods, a systematic grid, and
    /// radial rings.
    fn generate_candidates(&self, world: &WorldSnapshot) -> Vec<Position> {
        let mut seen: HashSet<(i64, i64)> = HashSet::new();
        let mut out = Vec::new();
        let push = |position: Position, seen: &mut HashSet<(i64, i64)>, out: &mut Vec<Position>| {
            if manhattan(position, ORIGIN) < self.config.min_spawn_distance {
                return;
            }
            if seen.insert((position.x, position.y)) {
                out.push(position);
            }
        };

        // Strategy 1: sample around pellets a fresh spawn could reach and
        // that plausibly chain on toward the origin.
        let reach = self.config.spawn_fuel;
        for pellet in world.pellets() {
            if !self.pellet_chains_home(world, pellet.position, pellet.fuel) {
                continue;
            }
            for distance in [reach.max(1), (reach / 2).max(1)] {
                for (dx, dy) in COMPASS {
                    let candidate = pellet.position.offset(dx * distance, dy * distance);
                    push(candidate, &mut seen, &mut out);
                }
            }
        }

        // Strategy 2: systematic grid across the search annulus.
        let min_radius = self.config.min_spawn_distance;
        let max_radius = min_radius + self.spawn.search_margin;
        let spacing = self.spawn.grid_spacing.max(1);
        let mut x = -max_radius;
        while x <= max_radius {
            let mut y = -max_radius;
            while y <= max_radius {
                let candidate = Position::new(x, y);
                if candidate.distance_to_origin() <= max_radius {
                    push(candidate, &mut seen, &mut out);
                }
                y += spacing;
            }
            x += spacing;
        }

        // Strategy 3: radial angular sampling at a few fixed distances.
        let rings = self.spawn.radial_rings.max(1);
        for ring in 0..rings {
            let radius = min_radius + (self.spawn.search_margin * ring as i64) / rings as i64;
            for sample in 0..self.spawn.radial_samples {
                let angle =
                    (sample as f64 / self.spawn.radial_samples as f64) * core::f64::consts::TAU;
                let candidate = Position::new(
                    (radius as f64 * angle.cos()).round() as i64,
                    (radius as f64 * angle.sin()).round() as i64,
                );
                push(candidate, &mut seen, &mut out);
            }
        }

        out
    }

    /// Can a ship refueled at this pellet plausibly carry on home? Either
    /// the pellet's own fuel covers the rest of the way, or it reaches one
    /// more pellet whose fuel does. One-hop chain, same spirit as the
    /// search's lookahead.
    fn pellet_chains_home(&self, world: &WorldSnapshot, position: Position, fuel: i64) -> bool {
        let budget = fuel.min(self.config.max_fuel);
        if budget >= manhattan(position, ORIGIN) {
            return true;
        }
        world.pellets().any(|next| {
            next.position != position
                && manhattan(position, next.position) <= budget
                && next.fuel.min(self.config.max_fuel) >= manhattan(next.position, ORIGIN)
        })
    }
}

const COMPASS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
