//! Player registry and token issuance
//!
//! Every joined player holds an opaque 32-character lowercase hex token.
//! The token is the only credential: per-player endpoints look the caller up
//! here and a retired player's token stops resolving.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::map::MapId;

/// Length of an auth token in hex characters.
pub const TOKEN_LENGTH: usize = 32;

/// Opaque player credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Produces tokens from two independently seeded 64-bit generators.
pub struct TokenGenerator {
    first: StdRng,
    second: StdRng,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            first: StdRng::from_entropy(),
            second: StdRng::from_entropy(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        Token(format!(
            "{:016x}{:016x}",
            self.first.gen::<u64>(),
            self.second.gen::<u64>()
        ))
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry entry for a live player.
#[derive(Debug, Clone)]
pub struct PlayerEntry {
    pub username: String,
    pub map_id: MapId,
    pub player_id: u64,
    pub joined_at_ms: u64,
}

/// Token-keyed registry of live players.
#[derive(Default)]
pub struct PlayerRegistry {
    by_token: HashMap<String, PlayerEntry>,
    generator: TokenGenerator,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            by_token: HashMap::new(),
            generator: TokenGenerator::new(),
        }
    }

    /// Register a joined player and hand back their token.
    pub fn insert(
        &mut self,
        username: &str,
        map_id: MapId,
        player_id: u64,
        joined_at_ms: u64,
    ) -> Token {
        let token = self.generator.next_token();
        let previous = self.by_token.insert(
            token.as_str().to_owned(),
            PlayerEntry {
                username: username.to_owned(),
                map_id,
                player_id,
                joined_at_ms,
            },
        );
        debug_assert!(previous.is_none(), "token collision");
        token
    }

    pub fn find(&self, token: &str) -> Option<&PlayerEntry> {
        self.by_token.get(token)
    }

    /// Remove a player by id; called on retirement.
    pub fn drop_player(&mut self, player_id: u64) {
        self.by_token.retain(|_, entry| entry.player_id != player_id);
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_32_lowercase_hex_chars() {
        let mut generator = TokenGenerator::new();
        for _ in 0..100 {
            let token = generator.next_token();
            assert_eq!(token.as_str().len(), TOKEN_LENGTH);
            assert!(token
                .as_str()
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
        }
    }

    #[test]
    fn registry_resolves_and_drops_players() {
        let mut registry = PlayerRegistry::new();
        let token = registry.insert("alice", MapId::new("m1"), 0, 0);
        let entry = registry.find(token.as_str()).unwrap();
        assert_eq!(entry.username, "alice");
        assert_eq!(entry.player_id, 0);

        registry.drop_player(0);
        assert!(registry.find(token.as_str()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn dropping_one_player_keeps_the_others() {
        let mut registry = PlayerRegistry::new();
        let t0 = registry.insert("a", MapId::new("m1"), 0, 0);
        let t1 = registry.insert("b", MapId::new("m1"), 1, 0);
        registry.drop_player(0);
        assert!(registry.find(t0.as_str()).is_none());
        assert!(registry.find(t1.as_str()).is_some());
    }
}
