//! Immutable snapshot of the live world, as handed over by the orchestration
//! layer between moves.
//!
//! The engine only reads from a snapshot. Pellet consumption happens in the
//! real world after a move is committed; the caller re-queries the ledger and
//! builds a fresh snapshot before the next decision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::geometry::{manhattan, Position};

/// A fuel pellet sitting on the grid. `resource_id` is the opaque reference
/// to the ledger entry backing it; the engine never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pellet {
    pub position: Position,
    pub fuel: i64,
    pub resource_id: String,
}

impl Pellet {
    pub fn new(position: Position, fuel: i64, resource_id: impl Into<String>) -> Self {
        Self {
            position,
            fuel,
            resource_id: resource_id.into(),
        }
    }
}

/// Another ship observed in the world. Only its position matters: rivals are
/// a crowding signal for spawn scoring, never obstacles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMarker {
    pub position: Position,
}

/// Our own ship: where it is and how much fuel it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipState {
    pub position: Position,
    pub fuel: i64,
}

impl ShipState {
    pub fn new(position: Position, fuel: i64) -> Self {
        Self { position, fuel }
    }

    /// Adds pellet fuel, clamped to `max_fuel`.
    pub fn refuel(&mut self, amount: i64, max_fuel: i64) {
        self.fuel = (self.fuel + amount).min(max_fuel);
    }

    /// Burns the fuel for one step and moves. A negative result is a plan
    /// bug, reported as an invariant violation rather than infeasibility.
    pub fn step_to(&mut self, next: Position, fuel_per_step: i64) -> Result<(), EngineError> {
        let remaining = self.fuel - fuel_per_step;
        if remaining < 0 {
            return Err(EngineError::FuelInvariant {
                position: next,
                fuel: remaining,
            });
        }
        self.fuel = remaining;
        self.position = next;
        Ok(())
    }
}

/// Read-only view over pellets and rival ships.
///
/// Pellets are keyed by cell in a `BTreeMap` so that every scan the planner
/// performs iterates in one deterministic order, which keeps repeated
/// searches over the same snapshot byte-for-byte reproducible.
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    pellets: BTreeMap<(i64, i64), Pellet>,
    agents: Vec<AgentMarker>,
}

impl WorldSnapshot {
    pub fn new(pellets: impl IntoIterator<Item = Pellet>, agents: Vec<AgentMarker>) -> Self {
        let pellets = pellets
            .into_iter()
            .map(|pellet| ((pellet.position.x, pellet.position.y), pellet))
            .collect();
        Self { pellets, agents }
    }

    pub fn pellet_at(&self, position: Position) -> Option<&Pellet> {
        self.pellets.get(&(position.x, position.y))
    }

    pub fn pellets(&self) -> impl Iterator<Item = &Pellet> {
        self.pellets.values()
    }

    pub fn pellet_count(&self) -> usize {
        self.pellets.len()
    }

    /// Pellets within `max_distance` of `position`, nearest first. Distance
    /// ties fall back to position order so results stay deterministic.
    pub fn pellets_within(&self, position: Position, max_distance: i64) -> Vec<&Pellet> {
        let mut found: Vec<&Pellet> = self
            .pellets
            .values()
            .filter(|pellet| manhattan(pellet.position, position) <= max_distance)
            .collect();
        found.sort_by_key(|pellet| (manhattan(pellet.position, position), pellet.position));
        found
    }

    pub fn agents(&self) -> &[AgentMarker] {
        &self.agents
    }

    /// Copy of this snapshot without the pellet at `position`. Used by the
    /// benchmark walker to mirror the live world consuming a pellet.
    pub fn without_pellet(&self, position: Position) -> WorldSnapshot {
        let mut next = self.clone();
        let _ = next.pellets.remove(&(position.x, position.y));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ORIGIN;

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot::new(
            vec![
                Pellet::new(Position::new(2, 0), 3, "a"),
                Pellet::new(Position::new(0, 2), 3, "b"),
                Pellet::new(Position::new(5, 5), 4, "c"),
            ],
            vec![],
        )
    }

    #[test]
    fn pellet_lookup_by_cell() {
        let world = snapshot();
        assert!(world.pellet_at(Position::new(2, 0)).is_some());
        assert!(world.pellet_at(Position::new(1, 1)).is_none());
    }

    #[test]
    fn pellets_within_sorted_nearest_first() {
        let world = snapshot();
        let near = world.pellets_within(ORIGIN, 4);
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].position, Position::new(0, 2));
        assert_eq!(near[1].position, Position::new(2, 0));
    }

    #[test]
    fn refuel_clamps_to_capacity() {
        let mut ship = ShipState::new(ORIGIN, 4);
        ship.refuel(10, 5);
        assert_eq!(ship.fuel, 5);
    }

    #[test]
    fn step_with_no_fuel_is_an_invariant_breach() {
        let mut ship = ShipState::new(Position::new(1, 0), 0);
        let err = ship.step_to(ORIGIN, 1).unwrap_err();
        assert!(matches!(err, EngineError::FuelInvariant { fuel: -1, .. }));
    }

    #[test]
    fn without_pellet_removes_only_that_cell() {
        let world = snapshot().without_pellet(Position::new(2, 0));
        assert!(world.pellet_at(Position::new(2, 0)).is_none());
        assert_eq!(world.pellet_count(), 2);
    }
}
