//! Decision engine for a fuel-constrained grid pilot.
//!
//! The engine plans movement for an autonomous ship on a discrete 2D grid
//! whose goal is always the origin. Every step burns one unit of fuel, and
//! fuel can only be recovered by crossing pellet cells that the live world
//! removes once consumed. Three components carry the real work:
//!
//! - [`pathfinder`]: fuel-aware A* plus a bounded two-leg refueling fallback
//!   and a pure route simulator.
//! - [`fuel`]: the refueling policy (when to top up, which pellet to take).
//! - [`spawn`]: candidate generation and scoring for picking a start cell.
//!
//! The engine operates purely on an in-memory [`world::WorldSnapshot`]; all
//! ledger access, move submission, and pellet consumption belong to the
//! orchestration layer that drives it.

pub mod autopilot;
pub mod benchmark;
pub mod config;
pub mod error;
pub mod fuel;
pub mod geometry;
pub mod pathfinder;
pub mod rng;
pub mod spawn;
pub mod world;

pub use autopilot::{Autopilot, MoveDecision};
pub use config::GameConfig;
pub use error::EngineError;
pub use fuel::{FuelManager, FuelStatus};
pub use geometry::{manhattan, Position, StepOffset, ORIGIN};
pub use pathfinder::{Path, Pathfinder};
pub use spawn::{SpawnCandidate, SpawnOptimizer};
pub use world::{Pellet, ShipState, WorldSnapshot};
