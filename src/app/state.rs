//! Application state shared across routes

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::game::Game;
use crate::store::RecordStore;

/// Shared application state
///
/// The game world sits behind one mutex: every command handler and the
/// ticker serialise through it, so a command either sees the world before a
/// concurrent tick or after it, never a mix.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Mutex<Game>>,
    pub records: RecordStore,
    /// True when a ticker drives the clock; the external tick endpoint is
    /// rejected in this mode.
    pub auto_tick: bool,
}

impl AppState {
    pub fn new(game: Game, records: RecordStore, auto_tick: bool) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
            records,
            auto_tick,
        }
    }
}
