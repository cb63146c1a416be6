//! Game aggregate: maps, lazy sessions, and the player registry
//!
//! One [`Game`] lives behind the state mutex for the whole process. It owns
//! the immutable maps, creates at most one session per map, and keeps the
//! token registry in step with joins and retirements.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ConfigError, GameConfig, LootGeneratorConfig};

use super::map::{Map, MapId};
use super::players::{PlayerEntry, PlayerRegistry, Token};
use super::session::{RetiredDog, Session, SpawnPolicy};
use super::Direction;

/// Result of a successful join.
#[derive(Debug)]
pub struct JoinOutcome {
    pub token: Token,
    pub player_id: u64,
}

pub struct Game {
    maps: Vec<Arc<Map>>,
    map_index: HashMap<MapId, usize>,
    sessions: HashMap<MapId, Session>,
    registry: PlayerRegistry,
    next_player_id: u64,
    loot_config: LootGeneratorConfig,
    retirement_threshold_ms: u64,
    spawn_policy: SpawnPolicy,
    session_seed: Option<u64>,
}

impl Game {
    /// Build the game world from a loaded config.
    pub fn new(config: &GameConfig, randomize_spawn: bool) -> Result<Self, ConfigError> {
        let defaults = config.map_defaults();
        let mut maps = Vec::with_capacity(config.maps.len());
        let mut map_index = HashMap::new();
        for map_config in &config.maps {
            let map = Map::from_config(map_config, &defaults)?;
            if map_index.insert(map.id().clone(), maps.len()).is_some() {
                return Err(ConfigError::DuplicateMap {
                    map: map_config.id.clone(),
                });
            }
            maps.push(Arc::new(map));
        }

        Ok(Self {
            maps,
            map_index,
            sessions: HashMap::new(),
            registry: PlayerRegistry::new(),
            next_player_id: 0,
            loot_config: config.loot_generator(),
            retirement_threshold_ms: config.retirement_threshold_ms(),
            spawn_policy: if randomize_spawn {
                SpawnPolicy::RandomRoad
            } else {
                SpawnPolicy::FirstRoadOrigin
            },
            session_seed: None,
        })
    }

    /// Force a deterministic RNG seed for sessions created from now on.
    /// Intended for tests; production sessions seed from entropy.
    pub fn set_session_seed(&mut self, seed: u64) {
        self.session_seed = Some(seed);
    }

    pub fn maps(&self) -> &[Arc<Map>] {
        &self.maps
    }

    pub fn find_map(&self, id: &str) -> Option<&Arc<Map>> {
        let id = MapId::new(id);
        self.map_index.get(&id).map(|&index| &self.maps[index])
    }

    /// Join a player onto a map, creating the map's session on first use.
    /// Returns `None` when the map does not exist.
    pub fn join(&mut self, map_id: &str, username: &str) -> Option<JoinOutcome> {
        let map = self.find_map(map_id)?.clone();
        let loot_config = self.loot_config;
        let retirement = self.retirement_threshold_ms;
        let seed = self.session_seed;
        let session = self
            .sessions
            .entry(map.id().clone())
            .or_insert_with(|| Session::new(map.clone(), loot_config, retirement, seed));

        let player_id = self.next_player_id;
        self.next_player_id += 1;
        let joined_at_ms = session.game_time_ms();
        session.add_dog(player_id, username, self.spawn_policy);

        let token = self
            .registry
            .insert(username, map.id().clone(), player_id, joined_at_ms);
        Some(JoinOutcome { token, player_id })
    }

    pub fn player_by_token(&self, token: &str) -> Option<&PlayerEntry> {
        self.registry.find(token)
    }

    pub fn session(&self, map_id: &MapId) -> Option<&Session> {
        self.sessions.get(map_id)
    }

    /// Steer a player's dog. Returns false when the session or dog is gone.
    pub fn set_velocity(&mut self, map_id: &MapId, player_id: u64, dir: Option<Direction>) -> bool {
        match self.sessions.get_mut(map_id) {
            Some(session) => session.set_velocity(player_id, dir),
            None => false,
        }
    }

    /// Advance every session by `dt_ms`. Retired dogs are removed from their
    /// sessions and from the registry, and handed to the caller for
    /// persistence.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<RetiredDog> {
        let mut retired = Vec::new();
        for session in self.sessions.values_mut() {
            retired.extend(session.tick(dt_ms));
        }
        for dog in &retired {
            self.registry.drop_player(dog.player_id);
        }
        retired
    }
}
