//! Grid geometry primitives: positions, the Manhattan metric, unit steps.

use core::fmt;
use serde::{Deserialize, Serialize};

/// The fixed goal every route ultimately aims at.
pub const ORIGIN: Position = Position { x: 0, y: 0 };

/// A cell on the unbounded grid. Coordinates are 64-bit signed because they
/// derive from on-ledger resource quantities and can grow large.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Canonical `"x,y"` form used as a map/dedup key.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn distance_to(&self, other: Position) -> i64 {
        manhattan(*self, other)
    }

    pub fn distance_to_origin(&self) -> i64 {
        manhattan(*self, ORIGIN)
    }

    pub fn offset(&self, dx: i64, dy: i64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Manhattan distance: |dx| + |dy|. Non-negative and symmetric.
pub fn manhattan(a: Position, b: Position) -> i64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// A single grid move, each axis clamped to {-1, 0, 1}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOffset {
    pub dx: i8,
    pub dy: i8,
}

impl StepOffset {
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Greedy single-step direction from `from` toward `to`, each axis clamped
/// independently. Fallback movement when no full path is available.
pub fn step_toward(from: Position, to: Position) -> StepOffset {
    StepOffset {
        dx: (to.x - from.x).clamp(-1, 1) as i8,
        dy: (to.y - from.y).clamp(-1, 1) as i8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_identity_is_zero() {
        let p = Position::new(17, -42);
        assert_eq!(manhattan(p, p), 0);
    }

    #[test]
    fn manhattan_is_symmetric() {
        let a = Position::new(3, -7);
        let b = Position::new(-12, 5);
        assert_eq!(manhattan(a, b), manhattan(b, a));
        assert_eq!(manhattan(a, b), 15 + 12);
    }

    #[test]
    fn manhattan_triangle_inequality() {
        let a = Position::new(0, 0);
        let b = Position::new(5, 5);
        let c = Position::new(-3, 9);
        assert!(manhattan(a, c) <= manhattan(a, b) + manhattan(b, c));
    }

    #[test]
    fn key_is_canonical() {
        assert_eq!(Position::new(-4, 11).key(), "-4,11");
        assert_eq!(Position::new(-4, 11).to_string(), "-4,11");
    }

    #[test]
    fn step_toward_clamps_each_axis() {
        let step = step_toward(Position::new(10, -10), Position::new(0, 0));
        assert_eq!(step, StepOffset { dx: -1, dy: 1 });
        let step = step_toward(Position::new(0, 3), Position::new(0, 0));
        assert_eq!(step, StepOffset { dx: 0, dy: -1 });
        assert!(step_toward(ORIGIN, ORIGIN).is_zero());
    }
}
