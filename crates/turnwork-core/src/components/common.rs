//! Identity and coordinate types shared across components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable actor identity. Survives save/load, unlike `hecs::Entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Stable reference to a world object (an item, a vehicle, a furniture piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

/// Activity type identifier, e.g. `ACT_DIG`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActivityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActivityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer world coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TriPoint {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chebyshev distance on the same z-level; different levels are never
    /// within reach of each other.
    pub fn square_distance(&self, other: &Self) -> Option<i32> {
        if self.z != other.z {
            return None;
        }
        Some((self.x - other.x).abs().max((self.y - other.y).abs()))
    }

    /// One step toward `target`, moving diagonally where possible.
    pub fn step_toward(&self, target: &Self) -> Self {
        Self {
            x: self.x + (target.x - self.x).signum(),
            y: self.y + (target.y - self.y).signum(),
            z: self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_distance() {
        let a = TriPoint::new(0, 0, 0);
        assert_eq!(a.square_distance(&TriPoint::new(3, -5, 0)), Some(5));
        assert_eq!(a.square_distance(&TriPoint::new(1, 1, 1)), None);
    }

    #[test]
    fn test_step_toward() {
        let a = TriPoint::new(0, 0, 0);
        assert_eq!(a.step_toward(&TriPoint::new(3, -2, 0)), TriPoint::new(1, -1, 0));
        assert_eq!(a.step_toward(&a), a);
    }

    #[test]
    fn test_activity_id_display() {
        let id = ActivityId::from("ACT_DIG");
        assert_eq!(id.to_string(), "ACT_DIG");
        assert_eq!(id.as_str(), "ACT_DIG");
        assert_eq!(ActorId(7).to_string(), "actor#7");
    }
}
