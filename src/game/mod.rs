//! Game simulation modules

pub mod collision;
pub mod loot;
pub mod map;
pub mod movement;
pub mod players;
pub mod session;
pub mod world;

pub use map::{Map, MapId};
pub use session::{Dog, LootItem, RetiredDog, Session};
pub use world::Game;

use serde::{Serialize, Serializer};

/// Continuous point or velocity in map space.
///
/// Serialises as a two-element array, the wire format the client expects for
/// `pos` and `speed` fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Serialize for Vec2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

/// Facing/steering direction of a dog.
///
/// The wire encoding follows the client's key names: `U`p, `R`ight, `D`own,
/// `L`eft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[serde(rename = "U")]
    North,
    #[serde(rename = "R")]
    East,
    #[serde(rename = "D")]
    South,
    #[serde(rename = "L")]
    West,
}

impl Direction {
    /// Parse a single-letter move key. Returns `None` for anything that is
    /// not one of `U`/`R`/`D`/`L`.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "U" => Some(Direction::North),
            "R" => Some(Direction::East),
            "D" => Some(Direction::South),
            "L" => Some(Direction::West),
            _ => None,
        }
    }

    /// Axis-aligned velocity with the given magnitude.
    ///
    /// The map's y axis grows downwards, so north is negative y.
    pub fn velocity(self, speed: f64) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0.0, -speed),
            Direction::East => Vec2::new(speed, 0.0),
            Direction::South => Vec2::new(0.0, speed),
            Direction::West => Vec2::new(-speed, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_move_keys() {
        assert_eq!(Direction::parse("U"), Some(Direction::North));
        assert_eq!(Direction::parse("L"), Some(Direction::West));
        assert_eq!(Direction::parse("x"), None);
        assert_eq!(Direction::parse(""), None);
    }

    #[test]
    fn direction_velocity_is_axis_aligned() {
        let v = Direction::East.velocity(2.0);
        assert_eq!((v.x, v.y), (2.0, 0.0));
        let v = Direction::North.velocity(3.0);
        assert_eq!((v.x, v.y), (0.0, -3.0));
    }

    #[test]
    fn vec2_serialises_as_pair() {
        let json = serde_json::to_string(&Vec2::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
    }
}
