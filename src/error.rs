//! Engine error taxonomy.
//!
//! Only two things are ever errors here: invalid configuration (rejected at
//! construction) and a fuel-invariant breach (a plan or caller drove fuel
//! negative). "No feasible route" and "no viable spawn" are ordinary values,
//! never errors.

use core::fmt;

use crate::geometry::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A configuration field failed validation.
    InvalidConfig { field: &'static str, value: i64 },
    /// Fuel went negative at `position`. Indicates the planner or executor
    /// produced an invalid plan, not an infeasible world.
    FuelInvariant { position: Position, fuel: i64 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, value } => {
                write!(f, "invalid config: {field}={value}")
            }
            Self::FuelInvariant { position, fuel } => {
                write!(f, "fuel invariant violated at {position}: fuel={fuel}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
