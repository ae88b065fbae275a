//! Compass directions and rotation modes for directional sprites.

use serde::{Deserialize, Serialize};

use crate::error::InvalidConfig;

/// Compass direction a capture faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    South,
    East,
    North,
    West,
}

/// Capture order for four-way rotation: yaw offsets +0, +90, +180, +270.
pub const FOUR_WAY: [Direction; 4] = [
    Direction::South,
    Direction::East,
    Direction::North,
    Direction::West,
];

impl Direction {
    /// File name suffix letter.
    pub fn suffix(&self) -> &'static str {
        match self {
            Direction::South => "s",
            Direction::East => "e",
            Direction::North => "n",
            Direction::West => "w",
        }
    }

    /// Returns the direction as a string identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::South => "south",
            Direction::East => "east",
            Direction::North => "north",
            Direction::West => "west",
        }
    }

    /// Yaw added to the configured camera yaw for this direction.
    pub fn yaw_step(&self) -> f64 {
        match self {
            Direction::South => 0.0,
            Direction::East => 90.0,
            Direction::North => 180.0,
            Direction::West => 270.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many directional captures are taken per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotations {
    /// One capture at the configured yaw, no suffix.
    Single,
    /// Four captures suffixed `_s`, `_e`, `_n`, `_w`.
    FourWay,
}

impl Rotations {
    /// Parses a raw rotation count.
    pub fn from_count(count: u32) -> Result<Self, InvalidConfig> {
        match count {
            1 => Ok(Rotations::Single),
            4 => Ok(Rotations::FourWay),
            other => Err(InvalidConfig::new(
                "rotations",
                format!("must be 1 or 4, got {}", other),
            )),
        }
    }

    /// Number of captures per model.
    pub fn count(&self) -> u32 {
        match self {
            Rotations::Single => 1,
            Rotations::FourWay => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_way_table() {
        let suffixes: Vec<_> = FOUR_WAY.iter().map(Direction::suffix).collect();
        assert_eq!(suffixes, ["s", "e", "n", "w"]);
        let steps: Vec<_> = FOUR_WAY.iter().map(Direction::yaw_step).collect();
        assert_eq!(steps, [0.0, 90.0, 180.0, 270.0]);
    }

    #[test]
    fn test_rotations_from_count() {
        assert_eq!(Rotations::from_count(1).unwrap(), Rotations::Single);
        assert_eq!(Rotations::from_count(4).unwrap(), Rotations::FourWay);
        for bad in [0, 2, 3, 8] {
            assert_eq!(Rotations::from_count(bad).unwrap_err().field, "rotations");
        }
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&Direction::North).unwrap();
        assert_eq!(json, "\"north\"");
    }
}
