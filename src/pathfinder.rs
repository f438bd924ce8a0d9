//! Fuel-aware route search.
//!
//! A best-first search over grid cells where every step burns fuel and
//! pellet cells top it back up. The search is deliberately conservative: a
//! neighbor whose fuel cannot cover the remaining distance is admitted only
//! when a single-pellet lookahead shows a refuel that would. That lookahead
//! is a cheap one-hop relaxation, not exhaustive reachability, so it can
//! both under- and over-admit relative to a full search. It is kept that way
//! on purpose; the two-leg fallback in [`Pathfinder::find_path_with_refueling`]
//! covers the common miss.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::geometry::{manhattan, Position, ORIGIN};
use crate::world::WorldSnapshot;

/// Hard cap on node expansions per search. Hitting it is reported as
/// infeasibility, never as an error.
pub const MAX_SEARCH_ITERATIONS: usize = 1000;

/// A planned route from start to goal, both inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Every cell visited, start first, goal last. Empty on failure.
    pub nodes: Vec<Position>,
    /// Total step count; `u64::MAX` on failure.
    pub cost: u64,
    /// Cells along the route where a refuel actually raised fuel, in order.
    pub fuel_stops: Vec<Position>,
    pub success: bool,
}

impl Path {
    /// The first-class "no feasible route" value.
    pub fn failed() -> Self {
        Self {
            nodes: Vec::new(),
            cost: u64::MAX,
            fuel_stops: Vec::new(),
            success: false,
        }
    }

    fn solved(nodes: Vec<Position>, fuel_stops: Vec<Position>) -> Self {
        let cost = nodes.len().saturating_sub(1) as u64;
        Self {
            nodes,
            cost,
            fuel_stops,
            success: true,
        }
    }
}

/// One entry in the search arena. Parents are arena indices so path
/// reconstruction is a simple back-walk.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    position: Position,
    g: u64,
    f: u64,
    fuel: i64,
    refueled: bool,
    parent: Option<usize>,
}

pub struct Pathfinder {
    config: GameConfig,
}

impl Pathfinder {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A* from `start` to `goal` under the fuel budget.
    ///
    /// With `consider_pellets` the search refuels (clamped to capacity) at
    /// every pellet cell it expands through. The search's own bookkeeping
    /// never removes a pellet: consumption only happens in the live world
    /// once a move is committed.
    pub fn find_path(
        &self,
        world: &WorldSnapshot,
        start: Position,
        goal: Position,
        initial_fuel: i64,
        consider_pellets: bool,
    ) -> Path {
        if initial_fuel < 0 {
            return Path::failed();
        }
        if start == goal {
            return Path::solved(vec![start], Vec::new());
        }

        let mut arena: Vec<SearchNode> = vec![SearchNode {
            position: start,
            g: 0,
            f: manhattan(start, goal) as u64,
            fuel: initial_fuel,
            refueled: false,
            parent: None,
        }];
        let mut open: Vec<usize> = vec![0];
        // Best g seen per cell; once a cell is expanded it is closed.
        let mut best_g: HashMap<(i64, i64), u64> = HashMap::new();
        let mut closed: HashSet<(i64, i64)> = HashSet::new();
        let _ = best_g.insert((start.x, start.y), 0);

        let mut iterations = 0usize;
        while !open.is_empty() {
            if iterations >= MAX_SEARCH_ITERATIONS {
                warn!(
                    start = %start,
                    goal = %goal,
                    iterations,
                    "search hit iteration cap, treating as infeasible"
                );
                return Path::failed();
            }
            iterations += 1;

            // Linear scan for minimum f. Strict `<` keeps the first-found
            // entry on ties, which makes repeated searches reproducible.
            let mut slot = 0usize;
            for (candidate, &index) in open.iter().enumerate() {
                if arena[index].f < arena[open[slot]].f {
                    slot = candidate;
                }
            }
            let current = open.swap_remove(slot);
            let node = arena[current];

            if node.position == goal {
                return self.reconstruct(&arena, current);
            }
            let cell = (node.position.x, node.position.y);
            if !closed.insert(cell) {
                continue;
            }

            for next in neighbors(node.position) {
                if closed.contains(&(next.x, next.y)) {
                    continue;
                }

                let mut fuel = node.fuel - self.config.fuel_per_step;
                if fuel < 0 {
                    continue;
                }
                let mut refueled = false;
                if consider_pellets {
                    if let Some(pellet) = world.pellet_at(next) {
                        let topped = (fuel + pellet.fuel).min(self.config.max_fuel);
                        refueled = topped > fuel;
                        fuel = topped;
                    }
                }

                let remaining = manhattan(next, goal);
                if fuel < remaining && !self.has_pellet_on_path(world, next, fuel, goal) {
                    continue;
                }

                let g = node.g + 1;
                match best_g.get(&(next.x, next.y)) {
                    Some(&seen) if seen <= g => continue,
                    _ => {}
                }
                let _ = best_g.insert((next.x, next.y), g);

                arena.push(SearchNode {
                    position: next,
                    g,
                    f: g + remaining as u64,
                    fuel,
                    refueled,
                    parent: Some(current),
                });
                open.push(arena.len() - 1);
            }
        }

        debug!(start = %start, goal = %goal, "open set exhausted, no feasible route");
        Path::failed()
    }

    /// Direct search first; on failure, a bounded two-leg fallback that
    /// routes through one pellet reachable within the initial fuel and picks
    /// the cheapest total. Strictly two legs, never a multi-hop chain.
    pub fn find_path_with_refueling(
        &self,
        world: &WorldSnapshot,
        start: Position,
        goal: Position,
        initial_fuel: i64,
    ) -> Path {
        let direct = self.find_path(world, start, goal, initial_fuel, true);
        if direct.success {
            return direct;
        }

        let mut best: Option<Path> = None;
        for pellet in world.pellets_within(start, initial_fuel) {
            if pellet.position == start {
                continue;
            }
            let leg_in = self.find_path(world, start, pellet.position, initial_fuel, true);
            if !leg_in.success {
                continue;
            }
            // Fuel estimate at the waypoint ignores refuels picked up along
            // the first leg, so it can only understate what a replay would
            // hold. Understating keeps the joined route simulation-safe.
            let at_waypoint =
                (initial_fuel - leg_in.cost as i64 + pellet.fuel).min(self.config.max_fuel);
            if at_waypoint < 0 {
                continue;
            }
            let leg_out = self.find_path(world, pellet.position, goal, at_waypoint, true);
            if !leg_out.success {
                continue;
            }

            let total = leg_in.cost + leg_out.cost;
            if best.as_ref().is_some_and(|path| path.cost <= total) {
                continue;
            }

            let mut nodes = leg_in.nodes.clone();
            nodes.extend(leg_out.nodes.iter().skip(1).copied());
            let mut fuel_stops = leg_in.fuel_stops.clone();
            if fuel_stops.last() != Some(&pellet.position) {
                fuel_stops.push(pellet.position);
            }
            fuel_stops.extend(leg_out.fuel_stops.iter().copied());
            best = Some(Path::solved(nodes, fuel_stops));
        }

        best.unwrap_or_else(Path::failed)
    }

    /// Pure replay of a concrete node sequence: burn per step, refuel at
    /// pellet cells, fail the moment fuel would go negative. No search.
    pub fn simulate_path(&self, world: &WorldSnapshot, path: &Path, initial_fuel: i64) -> bool {
        if !path.success {
            return false;
        }
        let mut fuel = initial_fuel;
        if fuel < 0 {
            return false;
        }
        for node in path.nodes.iter().skip(1) {
            fuel -= self.config.fuel_per_step;
            if fuel < 0 {
                return false;
            }
            if let Some(pellet) = world.pellet_at(*node) {
                fuel = (fuel + pellet.fuel).min(self.config.max_fuel);
            }
        }
        true
    }

    /// One-hop feasibility relaxation: is there any single pellet reachable
    /// with `fuel` from `from` whose refuel (clamped) covers the rest of the
    /// way to `goal`? Intentionally not a full search.
    fn has_pellet_on_path(
        &self,
        world: &WorldSnapshot,
        from: Position,
        fuel: i64,
        goal: Position,
    ) -> bool {
        world.pellets().any(|pellet| {
            let to_pellet = manhattan(from, pellet.position);
            if to_pellet > fuel {
                return false;
            }
            let after = (fuel - to_pellet + pellet.fuel).min(self.config.max_fuel);
            after >= manhattan(pellet.position, goal)
        })
    }

    fn reconstruct(&self, arena: &[SearchNode], goal_index: usize) -> Path {
        let mut nodes = Vec::new();
        let mut fuel_stops = Vec::new();
        let mut cursor = Some(goal_index);
        while let Some(index) = cursor {
            let node = &arena[index];
            nodes.push(node.position);
            if node.refueled {
                fuel_stops.push(node.position);
            }
            cursor = node.parent;
        }
        nodes.reverse();
        fuel_stops.reverse();
        Path::solved(nodes, fuel_stops)
    }
}

/// Neighbor cells for one step. Cardinal moves always apply; a diagonal is
/// allowed only when both axes move strictly toward the origin. The rule is
/// origin-coupled even when the search goal is elsewhere, matching the live
/// game where every route ends at the origin.
fn neighbors(from: Position) -> Vec<Position> {
    let mut out = vec![
        from.offset(1, 0),
        from.offset(-1, 0),
        from.offset(0, 1),
        from.offset(0, -1),
    ];
    let dx = (ORIGIN.x - from.x).signum();
    let dy = (ORIGIN.y - from.y).signum();
    if dx != 0 && dy != 0 {
        out.push(from.offset(dx, dy));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Pellet;

    fn finder() -> Pathfinder {
        Pathfinder::new(GameConfig::default())
    }

    #[test]
    fn trivial_path_at_zero_fuel() {
        let world = WorldSnapshot::default();
        let path = finder().find_path(&world, ORIGIN, ORIGIN, 0, true);
        assert!(path.success);
        assert_eq!(path.cost, 0);
        assert_eq!(path.nodes, vec![ORIGIN]);
    }

    #[test]
    fn no_fuel_no_route() {
        let world = WorldSnapshot::default();
        let path = finder().find_path(&world, Position::new(1, 0), ORIGIN, 0, true);
        assert!(!path.success);
        assert_eq!(path.cost, u64::MAX);
        assert!(path.nodes.is_empty());
    }

    #[test]
    fn diagonal_only_toward_origin() {
        let from = Position::new(3, 3);
        let cells = neighbors(from);
        assert!(cells.contains(&Position::new(2, 2)));
        assert!(!cells.contains(&Position::new(4, 4)));
        assert!(!cells.contains(&Position::new(4, 2)));
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn axis_aligned_cell_has_no_diagonal() {
        assert_eq!(neighbors(Position::new(5, 0)).len(), 4);
    }

    #[test]
    fn one_hop_lookahead_admits_pellet_assisted_route() {
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(2, 0), 5, "p")], vec![]);
        let pf = finder();
        assert!(pf.has_pellet_on_path(&world, Position::new(4, 0), 2, ORIGIN));
        assert!(!pf.has_pellet_on_path(&world, Position::new(4, 0), 1, ORIGIN));
    }

    #[test]
    fn pellet_on_route_is_picked_up_by_direct_search() {
        // Direct distance 8, fuel 4: reachable only through the pellet.
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(4, 0), 5, "p")], vec![]);
        let pf = finder();
        let start = Position::new(8, 0);
        let path = pf.find_path_with_refueling(&world, start, ORIGIN, 4);
        assert!(path.success);
        assert!(path.nodes.contains(&Position::new(4, 0)));
        assert!(path.fuel_stops.contains(&Position::new(4, 0)));
        assert!(pf.simulate_path(&world, &path, 4));
    }

    #[test]
    fn two_leg_fallback_covers_pellet_chain_the_lookahead_misses() {
        // A chain of 1-fuel pellets down the column. The one-hop lookahead
        // cannot see past a single pellet, so the direct search prunes the
        // very first neighbor. Splitting at the nearest pellet restarts the
        // search there and the chain carries it home.
        let world = WorldSnapshot::new(
            vec![
                Pellet::new(Position::new(0, 4), 1, "c4"),
                Pellet::new(Position::new(0, 3), 1, "c3"),
                Pellet::new(Position::new(0, 2), 1, "c2"),
                Pellet::new(Position::new(0, 1), 1, "c1"),
            ],
            vec![],
        );
        let pf = finder();
        let start = Position::new(0, 5);

        assert!(!pf.find_path(&world, start, ORIGIN, 2, true).success);
        let path = pf.find_path_with_refueling(&world, start, ORIGIN, 2);
        assert!(path.success);
        assert_eq!(path.cost, 5);
        assert_eq!(path.nodes.first(), Some(&start));
        assert_eq!(path.nodes.last(), Some(&ORIGIN));
        assert!(pf.simulate_path(&world, &path, 2));
    }

    #[test]
    fn simulator_rejects_fuel_starved_sequence() {
        let world = WorldSnapshot::default();
        let fake = Path::solved(
            vec![
                Position::new(2, 0),
                Position::new(1, 0),
                ORIGIN,
            ],
            Vec::new(),
        );
        let pf = finder();
        assert!(pf.simulate_path(&world, &fake, 2));
        assert!(!pf.simulate_path(&world, &fake, 1));
    }
}
