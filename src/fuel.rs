//! Refueling policy: when to top up, which pellet to take.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GameConfig;
use crate::geometry::{manhattan, Position, ORIGIN};
use crate::pathfinder::Path;
use crate::world::{Pellet, WorldSnapshot};

/// Tunable thresholds for the refueling policy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FuelPolicy {
    /// Below this many pellets in the world, the manager goes conservative.
    pub scarcity_threshold: usize,
    /// Refuel reserve while conservative.
    pub conservative_reserve: i64,
    /// Refuel reserve otherwise.
    pub normal_reserve: i64,
    /// Weight on distance-to-origin progress gained by the detour.
    pub progress_weight: f64,
    /// Weight on the pellet's fuel value.
    pub value_weight: f64,
    /// Weight (negative contribution) on the detour distance.
    pub distance_weight: f64,
    /// Flat bonus when the post-refuel fuel reaches the origin directly.
    pub finisher_bonus: f64,
}

impl Default for FuelPolicy {
    fn default() -> Self {
        Self {
            scarcity_threshold: 10,
            conservative_reserve: 3,
            normal_reserve: 2,
            progress_weight: 2.0,
            value_weight: 1.5,
            distance_weight: 1.0,
            finisher_bonus: 100.0,
        }
    }
}

/// Categorical fuel assessment, for observability only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelStatus {
    /// Tank is empty; the ship cannot move at all.
    Critical,
    /// Current fuel covers the direct run to the origin.
    Sufficient,
    /// Short of the origin, but at least one pellet is in reach.
    LowWithOptions,
    /// Short of the origin with nothing reachable to top up from.
    LowNoOptions,
}

impl fmt::Display for FuelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Critical => "critical",
            Self::Sufficient => "sufficient",
            Self::LowWithOptions => "low-with-options",
            Self::LowNoOptions => "low-no-options",
        };
        f.write_str(label)
    }
}

/// Stateful refueling policy. The conservative-mode flag is the only mutable
/// state in the engine; each concurrent evaluation owns its own manager.
pub struct FuelManager {
    config: GameConfig,
    policy: FuelPolicy,
    conservative: bool,
}

impl FuelManager {
    pub fn new(config: GameConfig) -> Self {
        Self::with_policy(config, FuelPolicy::default())
    }

    pub fn with_policy(config: GameConfig, policy: FuelPolicy) -> Self {
        Self {
            config,
            policy,
            conservative: false,
        }
    }

    pub fn is_conservative(&self) -> bool {
        self.conservative
    }

    /// Conservative iff the observed pellet count is below the scarcity
    /// threshold. Called once per snapshot before any decision.
    pub fn update_strategy(&mut self, pellet_count: usize) {
        let conservative = pellet_count < self.policy.scarcity_threshold;
        if conservative != self.conservative {
            debug!(pellet_count, conservative, "refuel strategy switched");
        }
        self.conservative = conservative;
    }

    /// Whether the ship should divert to refuel now.
    ///
    /// False whenever refueling is pointless: fuel already covers the direct
    /// run home, or no pellet is reachable with what's left. With an empty
    /// tank the answer is yes exactly when a pellet is actionable (that is,
    /// sitting on the current cell).
    pub fn needs_refueling(&self, world: &WorldSnapshot, position: Position, fuel: i64) -> bool {
        if fuel >= manhattan(position, ORIGIN) {
            return false;
        }
        if world.pellets_within(position, fuel).is_empty() {
            return false;
        }
        if fuel == 0 {
            return true;
        }
        let reserve = if self.conservative {
            self.policy.conservative_reserve
        } else {
            self.policy.normal_reserve
        };
        fuel < reserve
    }

    /// Highest-scoring reachable pellet, or none. Scores trade off progress
    /// toward the origin, the pellet's fuel value, and the detour length,
    /// with a flat bonus when the refuel alone finishes the trip.
    pub fn find_best_refuel_target<'world>(
        &self,
        world: &'world WorldSnapshot,
        position: Position,
        fuel: i64,
    ) -> Option<&'world Pellet> {
        let mut best: Option<(&Pellet, f64)> = None;
        for pellet in world.pellets_within(position, fuel) {
            let detour = manhattan(position, pellet.position);
            let progress =
                manhattan(position, ORIGIN) - manhattan(pellet.position, ORIGIN);
            let after = (fuel - detour + pellet.fuel).min(self.config.max_fuel);

            let mut score = self.policy.progress_weight * progress as f64
                + self.policy.value_weight * pellet.fuel as f64
                - self.policy.distance_weight * detour as f64;
            if after >= manhattan(pellet.position, ORIGIN) {
                score += self.policy.finisher_bonus;
            }

            // Strictly-greater keeps the nearest candidate on ties; the
            // reachable set is already in deterministic order.
            if best.is_none_or(|(_, seen)| score > seen) {
                best = Some((pellet, score));
            }
        }
        best.map(|(pellet, _)| pellet)
    }

    /// Can the ship still make the origin from here? Direct fuel counts;
    /// otherwise any reachable pellet strictly closer to the origin counts
    /// as progress. One-hop heuristic, same approximation as the search's
    /// pellet lookahead.
    pub fn can_reach_origin(&self, world: &WorldSnapshot, position: Position, fuel: i64) -> bool {
        let remaining = manhattan(position, ORIGIN);
        if fuel >= remaining {
            return true;
        }
        world
            .pellets_within(position, fuel)
            .iter()
            .any(|pellet| manhattan(pellet.position, ORIGIN) < remaining)
    }

    /// Replays `path`, recording every cell where a refuel actually raised
    /// fuel (skipped when already at capacity). If fuel would go negative,
    /// the replay stops but the stops found so far are still returned.
    pub fn plan_fuel_stops(
        &self,
        world: &WorldSnapshot,
        path: &Path,
        initial_fuel: i64,
    ) -> Vec<Position> {
        let mut stops = Vec::new();
        let mut fuel = initial_fuel;
        for node in path.nodes.iter().skip(1) {
            fuel -= self.config.fuel_per_step;
            if fuel < 0 {
                break;
            }
            if let Some(pellet) = world.pellet_at(*node) {
                let topped = (fuel + pellet.fuel).min(self.config.max_fuel);
                if topped > fuel {
                    stops.push(*node);
                }
                fuel = topped;
            }
        }
        stops
    }

    pub fn fuel_status(&self, world: &WorldSnapshot, position: Position, fuel: i64) -> FuelStatus {
        if fuel <= 0 {
            return FuelStatus::Critical;
        }
        if fuel >= manhattan(position, ORIGIN) {
            return FuelStatus::Sufficient;
        }
        if world.pellets_within(position, fuel).is_empty() {
            FuelStatus::LowNoOptions
        } else {
            FuelStatus::LowWithOptions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinder::Pathfinder;

    fn manager() -> FuelManager {
        FuelManager::new(GameConfig::default())
    }

    #[test]
    fn scarcity_flips_conservative_mode() {
        let mut fm = manager();
        fm.update_strategy(25);
        assert!(!fm.is_conservative());
        fm.update_strategy(9);
        assert!(fm.is_conservative());
    }

    #[test]
    fn empty_tank_on_a_pellet_wants_refueling() {
        let position = Position::new(6, 0);
        let world = WorldSnapshot::new(vec![Pellet::new(position, 3, "here")], vec![]);
        assert!(manager().needs_refueling(&world, position, 0));
    }

    #[test]
    fn empty_tank_with_nothing_reachable_does_not() {
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(9, 9), 3, "far")], vec![]);
        assert!(!manager().needs_refueling(&world, Position::new(6, 0), 0));
    }

    #[test]
    fn direct_coverage_never_refuels() {
        let position = Position::new(3, 0);
        let world = WorldSnapshot::new(vec![Pellet::new(position, 3, "here")], vec![]);
        assert!(!manager().needs_refueling(&world, position, 3));
    }

    #[test]
    fn conservative_mode_raises_the_reserve() {
        let position = Position::new(10, 0);
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(9, 0), 3, "p")], vec![]);
        let mut fm = manager();
        fm.update_strategy(50);
        assert!(!fm.needs_refueling(&world, position, 2));
        fm.update_strategy(0);
        assert!(fm.needs_refueling(&world, position, 2));
    }

    #[test]
    fn finisher_pellet_beats_richer_detour() {
        // The (1,0) pellet finishes the trip outright; the fatter pellet
        // behind the ship should lose despite its fuel value.
        let world = WorldSnapshot::new(
            vec![
                Pellet::new(Position::new(1, 0), 2, "finisher"),
                Pellet::new(Position::new(5, 0), 5, "rich"),
            ],
            vec![],
        );
        let fm = manager();
        let target = fm
            .find_best_refuel_target(&world, Position::new(3, 0), 2)
            .expect("a pellet is reachable");
        assert_eq!(target.position, Position::new(1, 0));
    }

    #[test]
    fn reachability_via_strictly_closer_pellet() {
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(4, 0), 5, "p")], vec![]);
        let fm = manager();
        assert!(fm.can_reach_origin(&world, Position::new(6, 0), 2));
        assert!(!fm.can_reach_origin(&world, Position::new(6, 0), 1));
    }

    #[test]
    fn fuel_stop_plan_skips_full_tank_and_survives_shortfall() {
        let world = WorldSnapshot::new(
            vec![
                Pellet::new(Position::new(4, 0), 3, "a"),
                Pellet::new(Position::new(2, 0), 3, "b"),
            ],
            vec![],
        );
        let fm = manager();
        let pf = Pathfinder::new(GameConfig::default());
        let path = pf.find_path(&world, Position::new(5, 0), ORIGIN, 5, true);
        assert!(path.success);
        // Fuel never hits capacity before (4,0), so both pellets count.
        assert_eq!(
            fm.plan_fuel_stops(&world, &path, 5),
            vec![Position::new(4, 0), Position::new(2, 0)]
        );
    }

    #[test]
    fn starved_fuel_stop_plan_keeps_partial_stops() {
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(2, 0), 1, "p")], vec![]);
        let fm = manager();
        let path = Path {
            nodes: vec![
                Position::new(3, 0),
                Position::new(2, 0),
                Position::new(1, 0),
                ORIGIN,
            ],
            cost: 3,
            fuel_stops: vec![Position::new(2, 0)],
            success: true,
        };
        // The refuel at (2,0) is recorded, then the replay runs dry one
        // step short and aborts without dropping it.
        assert_eq!(fm.plan_fuel_stops(&world, &path, 1), vec![Position::new(2, 0)]);
    }

    #[test]
    fn status_categories() {
        let world = WorldSnapshot::new(vec![Pellet::new(Position::new(7, 0), 3, "p")], vec![]);
        let fm = manager();
        assert_eq!(fm.fuel_status(&world, Position::new(8, 0), 0), FuelStatus::Critical);
        assert_eq!(
            fm.fuel_status(&world, Position::new(3, 0), 4),
            FuelStatus::Sufficient
        );
        assert_eq!(
            fm.fuel_status(&world, Position::new(8, 0), 2),
            FuelStatus::LowWithOptions
        );
        assert_eq!(
            fm.fuel_status(&world, Position::new(20, 0), 2),
            FuelStatus::LowNoOptions
        );
    }
}
