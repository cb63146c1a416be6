//! Per-map session and the tick pipeline
//!
//! A session owns the live state of one map: its dogs, the loot on the
//! ground, and the monotonic game clock. `tick` runs the whole simulation
//! step in a fixed order: advance clock, move, resolve collisions, stamp
//! activity, retire idle dogs, spawn loot.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::LootGeneratorConfig;

use super::collision::{self, Gatherer, Item};
use super::loot::LootGenerator;
use super::map::{Map, OFFICE_RADIUS};
use super::movement;
use super::{Direction, Vec2};

/// Gather width of a moving dog.
const DOG_GATHER_WIDTH: f64 = 0.3;

/// Loot never spawns closer than this to a road's endpoints.
const LOOT_SPAWN_MARGIN: f64 = 0.5;

/// One item carried in a bag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BagItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub loot_type: usize,
}

/// Capacity-bounded loot container.
#[derive(Debug, Clone)]
pub struct Bag {
    capacity: usize,
    items: Vec<BagItem>,
}

impl Bag {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Add an item unless the bag is full.
    pub fn try_add(&mut self, id: u64, loot_type: usize) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push(BagItem { id, loot_type });
        true
    }

    /// Empty the bag, handing its contents to the caller.
    pub fn drain(&mut self) -> Vec<BagItem> {
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[BagItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A player's avatar.
#[derive(Debug, Clone)]
pub struct Dog {
    pub id: u64,
    pub name: String,
    pub pos: Vec2,
    pub speed: Vec2,
    pub dir: Direction,
    pub bag: Bag,
    pub score: u32,
    joined_at_ms: u64,
    last_activity_ms: u64,
    steered: bool,
}

/// Loot lying on a road.
#[derive(Debug, Clone, Copy)]
pub struct LootItem {
    pub id: u64,
    pub loot_type: usize,
    pub pos: Vec2,
}

/// Where a freshly joined dog is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPolicy {
    /// The start point of the map's first road.
    FirstRoadOrigin,
    /// A uniform point on a uniformly chosen road.
    RandomRoad,
}

/// A dog that left the game through inactivity.
#[derive(Debug, Clone, PartialEq)]
pub struct RetiredDog {
    pub player_id: u64,
    pub name: String,
    pub score: u32,
    pub play_time_seconds: f64,
}

/// Live state of one map.
pub struct Session {
    map: Arc<Map>,
    dogs: Vec<Dog>,
    loot: Vec<LootItem>,
    game_time_ms: u64,
    next_loot_id: u64,
    rng: ChaCha8Rng,
    loot_generator: LootGenerator,
    retirement_threshold_ms: u64,
}

impl Session {
    pub fn new(
        map: Arc<Map>,
        loot_config: LootGeneratorConfig,
        retirement_threshold_ms: u64,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            map,
            dogs: Vec::new(),
            loot: Vec::new(),
            game_time_ms: 0,
            next_loot_id: 0,
            rng,
            loot_generator: LootGenerator::new(loot_config),
            retirement_threshold_ms,
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    pub fn loot(&self) -> &[LootItem] {
        &self.loot
    }

    /// Milliseconds of simulated time since the session was created.
    pub fn game_time_ms(&self) -> u64 {
        self.game_time_ms
    }

    /// Add a new dog with the given process-wide player id. Bag capacity and
    /// speed are frozen from the map at this moment.
    pub fn add_dog(&mut self, player_id: u64, name: &str, policy: SpawnPolicy) -> &Dog {
        let pos = self.spawn_position(policy);
        self.dogs.push(Dog {
            id: player_id,
            name: name.to_owned(),
            pos,
            speed: Vec2::ZERO,
            dir: Direction::North,
            bag: Bag::new(self.map.bag_capacity()),
            score: 0,
            joined_at_ms: self.game_time_ms,
            last_activity_ms: self.game_time_ms,
            steered: false,
        });
        self.dogs.last().expect("dog was just pushed")
    }

    pub fn dog(&self, player_id: u64) -> Option<&Dog> {
        self.dogs.iter().find(|dog| dog.id == player_id)
    }

    /// Steer a dog: `Some(dir)` sets an axis-aligned velocity at map speed,
    /// `None` stops it. The facing direction keeps its last steered value.
    /// Returns false when the dog is not in this session.
    pub fn set_velocity(&mut self, player_id: u64, dir: Option<Direction>) -> bool {
        let speed = self.map.dog_speed();
        let Some(dog) = self.dogs.iter_mut().find(|dog| dog.id == player_id) else {
            return false;
        };
        match dir {
            Some(dir) => {
                dog.speed = dir.velocity(speed);
                dog.dir = dir;
            }
            None => dog.speed = Vec2::ZERO,
        }
        dog.steered = true;
        true
    }

    /// Advance the session by `dt_ms` of simulated time and return the dogs
    /// retired by inactivity, each exactly once.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<RetiredDog> {
        self.game_time_ms += dt_ms;
        let dt_secs = dt_ms as f64 / 1000.0;

        // Move every dog, remembering where it started.
        let mut tracks = Vec::with_capacity(self.dogs.len());
        for dog in &mut self.dogs {
            let from = dog.pos;
            let moved = movement::resolve(dog.pos, dog.speed, dt_secs, self.map.roads());
            dog.pos = moved.pos;
            dog.speed = moved.speed;
            tracks.push((from, dog.pos));
        }

        // Collision input: loot first, then offices, so handlers can tell
        // them apart by index range.
        let gatherers: Vec<Gatherer> = tracks
            .iter()
            .map(|&(start, end)| Gatherer {
                start,
                end,
                width: DOG_GATHER_WIDTH,
            })
            .collect();
        let mut items: Vec<Item> = self
            .loot
            .iter()
            .map(|loot| Item {
                pos: loot.pos,
                radius: 0.0,
            })
            .collect();
        let office_base = items.len();
        items.extend(self.map.offices().iter().map(|office| Item {
            pos: office.position().into(),
            radius: OFFICE_RADIUS,
        }));

        let mut collected = vec![false; self.loot.len()];
        let mut handled = vec![false; self.dogs.len()];

        for event in collision::find_gather_events(&gatherers, &items) {
            if event.item < office_base {
                // Loot: first dog to reach it wins; a full bag leaves the
                // item on the ground.
                if collected[event.item] {
                    continue;
                }
                let loot = self.loot[event.item];
                let dog = &mut self.dogs[event.gatherer];
                if dog.bag.try_add(loot.id, loot.loot_type) {
                    collected[event.item] = true;
                    handled[event.gatherer] = true;
                }
            } else {
                // Office: drain the bag, crediting each item's value.
                let dog = &mut self.dogs[event.gatherer];
                let drained = dog.bag.drain();
                if !drained.is_empty() {
                    handled[event.gatherer] = true;
                }
                for item in drained {
                    dog.score += self.map.loot_types()[item.loot_type].value;
                }
            }
        }

        let mut index = 0;
        self.loot.retain(|_| {
            let keep = !collected[index];
            index += 1;
            keep
        });

        // Activity: moving, collecting/depositing, or a steer received since
        // the previous tick all count.
        let now = self.game_time_ms;
        for (index, dog) in self.dogs.iter_mut().enumerate() {
            if !dog.speed.is_zero() || handled[index] || dog.steered {
                dog.last_activity_ms = now;
            }
            dog.steered = false;
        }

        // Retire dogs idle past the threshold.
        let threshold = self.retirement_threshold_ms;
        let mut retired = Vec::new();
        self.dogs.retain(|dog| {
            if now.saturating_sub(dog.last_activity_ms) >= threshold {
                retired.push(RetiredDog {
                    player_id: dog.id,
                    name: dog.name.clone(),
                    score: dog.score,
                    play_time_seconds: (now - dog.joined_at_ms) as f64 / 1000.0,
                });
                false
            } else {
                true
            }
        });

        // Spawn new loot, never more than one item per active dog.
        let roll = self.rng.gen_range(0.0..1.0);
        let count = self
            .loot_generator
            .generate(dt_ms, self.loot.len(), self.dogs.len(), roll);
        for _ in 0..count {
            if let Some(item) = self.spawn_loot() {
                self.loot.push(item);
            }
        }

        retired
    }

    fn spawn_position(&mut self, policy: SpawnPolicy) -> Vec2 {
        let roads = self.map.roads();
        let Some(first) = roads.first() else {
            return Vec2::ZERO;
        };
        match policy {
            SpawnPolicy::FirstRoadOrigin => first.start().into(),
            SpawnPolicy::RandomRoad => {
                let road = &roads[self.rng.gen_range(0..roads.len())];
                let (lo, hi) = road.span();
                let along = self.rng.gen_range(lo..=hi);
                if road.is_horizontal() {
                    Vec2::new(along, road.cross())
                } else {
                    Vec2::new(road.cross(), along)
                }
            }
        }
    }

    fn spawn_loot(&mut self) -> Option<LootItem> {
        let roads = self.map.roads();
        if roads.is_empty() || self.map.loot_types().is_empty() {
            return None;
        }
        let road = &roads[self.rng.gen_range(0..roads.len())];
        let (lo, hi) = road.span();
        let (lo, hi) = if hi - lo > 2.0 * LOOT_SPAWN_MARGIN {
            (lo + LOOT_SPAWN_MARGIN, hi - LOOT_SPAWN_MARGIN)
        } else {
            let mid = (lo + hi) / 2.0;
            (mid, mid)
        };
        let along = self.rng.gen_range(lo..=hi);
        let pos = if road.is_horizontal() {
            Vec2::new(along, road.cross())
        } else {
            Vec2::new(road.cross(), along)
        };
        let loot_type = self.rng.gen_range(0..self.map.loot_types().len());
        let id = self.next_loot_id;
        self.next_loot_id += 1;
        Some(LootItem { id, loot_type, pos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapDefaults;
    use serde_json::json;

    fn test_map(offices: bool) -> Arc<Map> {
        let mut map = json!({
            "id": "m1",
            "name": "Town",
            "dogSpeed": 2.0,
            "bagCapacity": 3,
            "roads": [{"x0": 0, "y0": 0, "x1": 10}],
            "lootTypes": [
                {"name": "key", "file": "key.obj", "type": "obj", "value": 3},
                {"name": "wallet", "file": "wallet.obj", "type": "obj", "value": 7}
            ]
        });
        if offices {
            map["offices"] = json!([{"id": "o1", "x": 10, "y": 0, "offsetX": 5, "offsetY": 0}]);
        }
        let cfg = serde_json::from_value(map).unwrap();
        let defaults = MapDefaults {
            dog_speed: 1.0,
            bag_capacity: 3,
        };
        Arc::new(Map::from_config(&cfg, &defaults).unwrap())
    }

    fn quiet_loot() -> LootGeneratorConfig {
        LootGeneratorConfig {
            period: 5.0,
            probability: 0.0,
        }
    }

    fn session(map: Arc<Map>) -> Session {
        Session::new(map, quiet_loot(), 60_000, Some(42))
    }

    fn place_loot(session: &mut Session, loot_type: usize, pos: Vec2) {
        let id = session.next_loot_id;
        session.next_loot_id += 1;
        session.loot.push(LootItem { id, loot_type, pos });
    }

    #[test]
    fn contested_loot_goes_to_the_lower_player_id() {
        let mut session = session(test_map(false));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.add_dog(1, "b", SpawnPolicy::FirstRoadOrigin);
        session.dogs[0].pos = Vec2::new(4.0, 0.0);
        session.dogs[1].pos = Vec2::new(6.0, 0.0);
        place_loot(&mut session, 0, Vec2::new(5.0, 0.0));

        session.set_velocity(0, Some(Direction::East));
        session.set_velocity(1, Some(Direction::West));
        session.tick(1000);

        assert_eq!(session.dogs[0].bag.len(), 1);
        assert_eq!(session.dogs[1].bag.len(), 0);
        assert_eq!(session.dogs[0].score, 0);
        assert!(session.loot().is_empty());
    }

    #[test]
    fn full_bag_leaves_loot_on_the_ground() {
        let mut session = session(test_map(false));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        for id in 0..3 {
            assert!(session.dogs[0].bag.try_add(id, 0));
        }
        place_loot(&mut session, 1, Vec2::new(1.0, 0.0));

        session.set_velocity(0, Some(Direction::East));
        session.tick(1000);

        assert_eq!(session.dogs[0].bag.len(), 3);
        assert_eq!(session.loot().len(), 1);
    }

    #[test]
    fn office_deposit_credits_score_and_empties_the_bag() {
        let mut session = session(test_map(true));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.dogs[0].pos = Vec2::new(8.0, 0.0);
        assert!(session.dogs[0].bag.try_add(0, 0));
        assert!(session.dogs[0].bag.try_add(1, 1));

        session.set_velocity(0, Some(Direction::East));
        session.tick(1000);

        assert!(session.dogs[0].bag.is_empty());
        assert_eq!(session.dogs[0].score, 10);
    }

    #[test]
    fn pickup_and_deposit_can_happen_in_one_tick() {
        let mut session = session(test_map(true));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.dogs[0].pos = Vec2::new(8.0, 0.0);
        place_loot(&mut session, 1, Vec2::new(9.0, 0.0));

        session.set_velocity(0, Some(Direction::East));
        session.tick(1000);

        // Reached the loot at t=0.5 and the office afterwards.
        assert!(session.dogs[0].bag.is_empty());
        assert_eq!(session.dogs[0].score, 7);
        assert!(session.loot().is_empty());
    }

    #[test]
    fn idle_dog_retires_after_the_threshold() {
        let map = test_map(false);
        let mut session = Session::new(map, quiet_loot(), 5_000, Some(42));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);

        assert!(session.tick(4_999).is_empty());
        let retired = session.tick(1);
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].player_id, 0);
        assert_eq!(retired[0].score, 0);
        assert!((retired[0].play_time_seconds - 5.0).abs() < 1e-9);
        assert!(session.dogs().is_empty());

        // Retirement fires exactly once.
        assert!(session.tick(10_000).is_empty());
    }

    #[test]
    fn steering_counts_as_activity_even_when_stopped() {
        let map = test_map(false);
        let mut session = Session::new(map, quiet_loot(), 5_000, Some(42));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);

        session.tick(4_000);
        // A stop command is still a steer; the idle clock restarts.
        session.set_velocity(0, None);
        assert!(session.tick(1_000).is_empty());
        assert!(session.tick(4_999).is_empty());
        assert_eq!(session.tick(1).len(), 1);
    }

    #[test]
    fn moving_dog_stays_active() {
        let map = test_map(false);
        let mut session = Session::new(map, quiet_loot(), 5_000, Some(42));
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.set_velocity(0, Some(Direction::East));

        // Active while moving; the idle clock starts once the dog hits the
        // far wall and its velocity is zeroed.
        assert!(session.tick(3_000).is_empty());
        assert!(session.tick(3_000).is_empty());
        assert!(session.tick(1_999).is_empty());
        assert_eq!(session.tick(1).len(), 1);
    }

    #[test]
    fn spawned_loot_lies_on_a_road_with_margin() {
        let map = test_map(false);
        let mut session = Session::new(
            map,
            LootGeneratorConfig {
                period: 1.0,
                probability: 1.0,
            },
            60_000,
            Some(7),
        );
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.set_velocity(0, Some(Direction::East));

        for _ in 0..50 {
            session.tick(1_000);
        }
        assert!(!session.loot().is_empty());
        for item in session.loot() {
            assert_eq!(item.pos.y, 0.0);
            assert!(item.pos.x >= 0.5 && item.pos.x <= 9.5);
            assert!(item.loot_type < 2);
        }
    }

    #[test]
    fn loot_count_never_exceeds_dog_count() {
        let map = test_map(false);
        let mut session = Session::new(
            map,
            LootGeneratorConfig {
                period: 1.0,
                probability: 1.0,
            },
            60_000,
            Some(7),
        );
        session.add_dog(0, "a", SpawnPolicy::FirstRoadOrigin);
        session.add_dog(1, "b", SpawnPolicy::FirstRoadOrigin);
        for _ in 0..20 {
            session.set_velocity(0, Some(Direction::East));
            session.set_velocity(1, Some(Direction::West));
            session.tick(1_000);
            assert!(session.loot().len() <= session.dogs().len());
        }
    }

    #[test]
    fn random_spawn_stays_on_the_road() {
        let mut session = session(test_map(false));
        for id in 0..20 {
            session.add_dog(id, "dog", SpawnPolicy::RandomRoad);
        }
        for dog in session.dogs() {
            assert_eq!(dog.pos.y, 0.0);
            assert!(dog.pos.x >= 0.0 && dog.pos.x <= 10.0);
        }
    }
}
