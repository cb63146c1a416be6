//! Periodic simulation driver for auto-tick mode
//!
//! The ticker measures the real time elapsed between firings and feeds it to
//! the game, so a delayed tick advances the simulation by the time actually
//! spent, not the nominal period.

use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

use crate::app::AppState;
use crate::store::persist_retirements;

/// Spawn the tick loop. Runs for the life of the process.
pub fn spawn(state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first firing completes immediately; use it to start the clock.
        timer.tick().await;
        let mut last_tick = Instant::now();

        loop {
            timer.tick().await;
            let now = Instant::now();
            let delta = now.duration_since(last_tick);
            last_tick = now;

            let retired = {
                let mut game = state.game.lock().await;
                game.tick(delta.as_millis() as u64)
            };
            if !retired.is_empty() {
                debug!(count = retired.len(), "retiring idle dogs");
                persist_retirements(&state.records, retired).await;
            }
        }
    });
}
