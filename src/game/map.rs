//! Immutable map geometry and loot descriptors
//!
//! A [`Map`] is built once from the scenario config and never mutated; all
//! live state (dogs, loot, clocks) belongs to the session layer.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::{ConfigError, MapConfig, MapDefaults};

use super::Vec2;

/// Half the walkable corridor width around a road's axis.
pub const ROAD_HALF_WIDTH: f64 = 0.4;

/// Collision radius of an office landmark.
pub const OFFICE_RADIUS: f64 = 0.5;

/// Opaque map identifier from the scenario config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Integer grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Vec2 {
        Vec2::new(p.x as f64, p.y as f64)
    }
}

/// Axis-aligned road segment with a walkable corridor of half-width 0.4.
#[derive(Debug, Clone, Copy)]
pub struct Road {
    start: Point,
    end: Point,
}

impl Road {
    pub fn horizontal(start: Point, end_x: i32) -> Self {
        Self {
            start,
            end: Point { x: end_x, y: start.y },
        }
    }

    pub fn vertical(start: Point, end_y: i32) -> Self {
        Self {
            start,
            end: Point { x: start.x, y: end_y },
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Endpoint range along the road's own axis, ordered low to high.
    pub fn span(&self) -> (f64, f64) {
        let (a, b) = if self.is_horizontal() {
            (self.start.x, self.end.x)
        } else {
            (self.start.y, self.end.y)
        };
        (a.min(b) as f64, a.max(b) as f64)
    }

    /// The fixed coordinate of the road axis: y for horizontal roads, x for
    /// vertical ones.
    pub fn cross(&self) -> f64 {
        if self.is_horizontal() {
            self.start.y as f64
        } else {
            self.start.x as f64
        }
    }

    /// Whether `p` lies inside the closed corridor, extended by the
    /// half-width past each endpoint (intersection cells belong to both
    /// corridors).
    pub fn corridor_contains(&self, p: Vec2, eps: f64) -> bool {
        let (lo, hi) = self.span();
        let (along, across) = if self.is_horizontal() {
            (p.x, p.y)
        } else {
            (p.y, p.x)
        };
        (across - self.cross()).abs() <= ROAD_HALF_WIDTH + eps
            && along >= lo - ROAD_HALF_WIDTH - eps
            && along <= hi + ROAD_HALF_WIDTH + eps
    }
}

impl Serialize for Road {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Road", 3)?;
        s.serialize_field("x0", &self.start.x)?;
        s.serialize_field("y0", &self.start.y)?;
        if self.is_horizontal() {
            s.serialize_field("x1", &self.end.x)?;
        } else {
            s.serialize_field("y1", &self.end.y)?;
        }
        s.end()
    }
}

/// Decorative building rectangle; buildings do not take part in collision.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Building {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Delivery office landmark. Logically a point with radius 0.5; the offset
/// only positions the sprite on the client.
#[derive(Debug, Clone)]
pub struct Office {
    id: String,
    position: Point,
    offset: (i32, i32),
}

impl Office {
    pub fn position(&self) -> Point {
        self.position
    }
}

impl Serialize for Office {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Office", 5)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("x", &self.position.x)?;
        s.serialize_field("y", &self.position.y)?;
        s.serialize_field("offsetX", &self.offset.0)?;
        s.serialize_field("offsetY", &self.offset.1)?;
        s.end()
    }
}

/// Descriptor of a spawnable loot kind. Everything except `value` is opaque
/// presentation data passed through to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootType {
    pub name: String,
    pub file: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    pub value: u32,
}

/// Immutable map: geometry, loot descriptors, and per-map gameplay numbers.
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    loot_types: Vec<LootType>,
    dog_speed: f64,
    bag_capacity: usize,
}

impl Map {
    /// Build a map from its config entry, falling back to the global
    /// defaults for speed and bag capacity.
    pub fn from_config(cfg: &MapConfig, defaults: &MapDefaults) -> Result<Self, ConfigError> {
        let mut roads = Vec::with_capacity(cfg.roads.len());
        for (index, road) in cfg.roads.iter().enumerate() {
            let start = Point { x: road.x0, y: road.y0 };
            let road = match (road.x1, road.y1) {
                (Some(x1), None) => Road::horizontal(start, x1),
                (None, Some(y1)) => Road::vertical(start, y1),
                _ => {
                    return Err(ConfigError::InvalidRoad {
                        map: cfg.id.clone(),
                        index,
                    })
                }
            };
            roads.push(road);
        }

        let buildings = cfg
            .buildings
            .iter()
            .map(|b| Building {
                x: b.x,
                y: b.y,
                w: b.w,
                h: b.h,
            })
            .collect();

        let offices = cfg
            .offices
            .iter()
            .map(|o| Office {
                id: o.id.clone(),
                position: Point { x: o.x, y: o.y },
                offset: (o.offset_x, o.offset_y),
            })
            .collect();

        Ok(Self {
            id: MapId::new(cfg.id.clone()),
            name: cfg.name.clone(),
            roads,
            buildings,
            offices,
            loot_types: cfg.loot_types.clone(),
            dog_speed: cfg.dog_speed.unwrap_or(defaults.dog_speed),
            bag_capacity: cfg.bag_capacity.unwrap_or(defaults.bag_capacity),
        })
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    pub fn loot_types(&self) -> &[LootType] {
        &self.loot_types
    }

    pub fn dog_speed(&self) -> f64 {
        self.dog_speed
    }

    pub fn bag_capacity(&self) -> usize {
        self.bag_capacity
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Map", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("roads", &self.roads)?;
        s.serialize_field("buildings", &self.buildings)?;
        s.serialize_field("offices", &self.offices)?;
        s.serialize_field("lootTypes", &self.loot_types)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map_config(value: serde_json::Value) -> MapConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn corridor_contains_extends_past_endpoints() {
        let road = Road::horizontal(Point { x: 0, y: 0 }, 10);
        assert!(road.corridor_contains(Vec2::new(5.0, 0.39), 0.0));
        assert!(road.corridor_contains(Vec2::new(10.4, 0.0), 0.0));
        assert!(road.corridor_contains(Vec2::new(-0.4, 0.0), 0.0));
        assert!(!road.corridor_contains(Vec2::new(5.0, 0.41), 0.0));
        assert!(!road.corridor_contains(Vec2::new(10.5, 0.0), 0.0));
    }

    #[test]
    fn span_orders_reversed_endpoints() {
        let road = Road::vertical(Point { x: 3, y: 8 }, 2);
        assert_eq!(road.span(), (2.0, 8.0));
        assert_eq!(road.cross(), 3.0);
    }

    #[test]
    fn map_defaults_fall_through_from_global_config() {
        let cfg = map_config(json!({
            "id": "m1",
            "name": "Town",
            "roads": [{"x0": 0, "y0": 0, "x1": 10}]
        }));
        let defaults = MapDefaults {
            dog_speed: 1.0,
            bag_capacity: 3,
        };
        let map = Map::from_config(&cfg, &defaults).unwrap();
        assert_eq!(map.dog_speed(), 1.0);
        assert_eq!(map.bag_capacity(), 3);

        let cfg = map_config(json!({
            "id": "m2",
            "name": "City",
            "dogSpeed": 4.0,
            "bagCapacity": 5,
            "roads": [{"x0": 0, "y0": 0, "y1": 10}]
        }));
        let map = Map::from_config(&cfg, &defaults).unwrap();
        assert_eq!(map.dog_speed(), 4.0);
        assert_eq!(map.bag_capacity(), 5);
    }

    #[test]
    fn road_with_both_endpoints_is_rejected() {
        let cfg = map_config(json!({
            "id": "m1",
            "name": "Town",
            "roads": [{"x0": 0, "y0": 0, "x1": 10, "y1": 10}]
        }));
        let defaults = MapDefaults {
            dog_speed: 1.0,
            bag_capacity: 3,
        };
        assert!(Map::from_config(&cfg, &defaults).is_err());
    }

    #[test]
    fn map_serialises_client_geometry() {
        let cfg = map_config(json!({
            "id": "m1",
            "name": "Town",
            "roads": [{"x0": 0, "y0": 0, "x1": 10}, {"x0": 10, "y0": 0, "y1": 5}],
            "buildings": [{"x": 1, "y": 1, "w": 2, "h": 2}],
            "offices": [{"id": "o1", "x": 10, "y": 0, "offsetX": 5, "offsetY": 0}],
            "lootTypes": [{"name": "key", "file": "key.obj", "type": "obj", "value": 3}]
        }));
        let defaults = MapDefaults {
            dog_speed: 1.0,
            bag_capacity: 3,
        };
        let map = Map::from_config(&cfg, &defaults).unwrap();
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value["roads"][0], json!({"x0": 0, "y0": 0, "x1": 10}));
        assert_eq!(value["roads"][1], json!({"x0": 10, "y0": 0, "y1": 5}));
        assert_eq!(
            value["offices"][0],
            json!({"id": "o1", "x": 10, "y": 0, "offsetX": 5, "offsetY": 0})
        );
        assert_eq!(value["lootTypes"][0]["value"], json!(3));
        assert!(value.get("dogSpeed").is_none());
    }
}
