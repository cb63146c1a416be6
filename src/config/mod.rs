//! Configuration module - map/scenario file parsing
//!
//! The scenario file is JSON: global defaults plus one entry per map. The
//! parsed structures stay close to the file shape; `game::Map` turns them
//! into the runtime model.

use std::path::Path;

use serde::Deserialize;

/// Dog speed applied when neither the map nor the global config sets one.
pub const DEFAULT_DOG_SPEED: f64 = 1.0;

/// Bag capacity applied when neither the map nor the global config sets one.
pub const DEFAULT_BAG_CAPACITY: usize = 3;

/// Seconds of inactivity before a dog retires, when the config is silent.
pub const DEFAULT_RETIREMENT_SECS: f64 = 60.0;

/// Loot generator fallback: one base period and per-slot probability.
pub const DEFAULT_LOOT_PERIOD_SECS: f64 = 5.0;
pub const DEFAULT_LOOT_PROBABILITY: f64 = 0.5;

/// Root of the scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub default_dog_speed: Option<f64>,
    pub default_bag_capacity: Option<usize>,
    /// Seconds, fractional values allowed.
    pub dog_retirement_time: Option<f64>,
    pub loot_generator_config: Option<LootGeneratorConfig>,
    pub maps: Vec<MapConfig>,
}

impl GameConfig {
    pub fn map_defaults(&self) -> MapDefaults {
        MapDefaults {
            dog_speed: self.default_dog_speed.unwrap_or(DEFAULT_DOG_SPEED),
            bag_capacity: self.default_bag_capacity.unwrap_or(DEFAULT_BAG_CAPACITY),
        }
    }

    pub fn loot_generator(&self) -> LootGeneratorConfig {
        self.loot_generator_config
            .unwrap_or(LootGeneratorConfig {
                period: DEFAULT_LOOT_PERIOD_SECS,
                probability: DEFAULT_LOOT_PROBABILITY,
            })
    }

    pub fn retirement_threshold_ms(&self) -> u64 {
        let secs = self.dog_retirement_time.unwrap_or(DEFAULT_RETIREMENT_SECS);
        (secs * 1000.0) as u64
    }
}

/// Global fallbacks a map entry may override.
#[derive(Debug, Clone, Copy)]
pub struct MapDefaults {
    pub dog_speed: f64,
    pub bag_capacity: usize,
}

/// Loot generator tuning: during a window of `period` seconds each empty
/// slot spawns with probability `probability`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LootGeneratorConfig {
    pub period: f64,
    pub probability: f64,
}

/// One map entry of the scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub id: String,
    pub name: String,
    pub dog_speed: Option<f64>,
    pub bag_capacity: Option<usize>,
    pub roads: Vec<RoadConfig>,
    #[serde(default)]
    pub buildings: Vec<BuildingConfig>,
    #[serde(default)]
    pub offices: Vec<OfficeConfig>,
    #[serde(default)]
    pub loot_types: Vec<crate::game::map::LootType>,
}

/// A road carries exactly one of `x1` (horizontal) or `y1` (vertical);
/// validation happens when the runtime map is built.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RoadConfig {
    pub x0: i32,
    pub y0: i32,
    pub x1: Option<i32>,
    pub y1: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BuildingConfig {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeConfig {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("road {index} of map {map} must set exactly one of x1/y1")]
    InvalidRoad { map: String, index: usize },

    #[error("map with id {map} already exists")]
    DuplicateMap { map: String },
}

/// Load and parse the scenario file.
pub fn load(path: &Path) -> Result<GameConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
