//! Step-by-step move policy tying the fuel manager and the route planner
//! together.
//!
//! One `decide` call per committed move: the orchestration layer executes
//! the returned step on the ledger, re-queries the world, and calls again
//! with the fresh snapshot.

use tracing::debug;

use crate::config::GameConfig;
use crate::fuel::{FuelManager, FuelStatus};
use crate::geometry::{step_toward, Position, StepOffset, ORIGIN};
use crate::pathfinder::Pathfinder;
use crate::world::{ShipState, WorldSnapshot};

/// What the ship should do next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveDecision {
    /// Next unit move; `None` once the ship sits on the origin.
    pub step: Option<StepOffset>,
    /// The pellet this move is heading for, when refueling drives it.
    pub refuel_target: Option<Position>,
    pub status: FuelStatus,
}

pub struct Autopilot {
    pathfinder: Pathfinder,
    fuel: FuelManager,
}

impl Autopilot {
    pub fn new(config: GameConfig) -> Self {
        Self {
            pathfinder: Pathfinder::new(config),
            fuel: FuelManager::new(config),
        }
    }

    pub fn fuel_manager(&self) -> &FuelManager {
        &self.fuel
    }

    /// Picks the next move for `ship` against `world`.
    ///
    /// Refueling wins when the policy calls for it and a target exists;
    /// otherwise the ship follows a planned route home. A failed plan is
    /// not fatal: the ship falls back to a greedy step toward the origin
    /// and replans from the next snapshot.
    pub fn decide(&mut self, world: &WorldSnapshot, ship: &ShipState) -> MoveDecision {
        self.fuel.update_strategy(world.pellet_count());
        let status = self.fuel.fuel_status(world, ship.position, ship.fuel);

        if ship.position == ORIGIN {
            return MoveDecision {
                step: None,
                refuel_target: None,
                status,
            };
        }

        let mut destination = ORIGIN;
        let mut refuel_target = None;
        if self.fuel.needs_refueling(world, ship.position, ship.fuel) {
            if let Some(pellet) = self
                .fuel
                .find_best_refuel_target(world, ship.position, ship.fuel)
            {
                destination = pellet.position;
                refuel_target = Some(pellet.position);
            }
        }

        let path =
            self.pathfinder
                .find_path_with_refueling(world, ship.position, destination, ship.fuel);
        let step = if path.success && path.nodes.len() > 1 {
            step_toward(ship.position, path.nodes[1])
        } else {
            debug!(from = %ship.position, to = %destination, %status, "no planned route, stepping greedily");
            step_toward(ship.position, destination)
        };

        MoveDecision {
            step: Some(step),
            refuel_target,
            status,
        }
    }
}
