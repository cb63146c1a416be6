//! Probabilistic loot spawning
//!
//! The generator is configured with a base period T and probability p: over
//! a window of length T each empty slot (an active dog without a matching
//! ground item) spawns with probability p. The random roll is passed in by
//! the caller so tests can drive the generator deterministically.

use crate::config::LootGeneratorConfig;

pub struct LootGenerator {
    period_secs: f64,
    probability: f64,
    time_without_loot_secs: f64,
}

impl LootGenerator {
    pub fn new(config: LootGeneratorConfig) -> Self {
        Self {
            period_secs: config.period,
            probability: config.probability,
            time_without_loot_secs: 0.0,
        }
    }

    /// Decide how many items to spawn after `dt_ms` elapsed, given the
    /// current ground-loot and dog counts. Guarantees
    /// `loot_count + returned <= looter_count`. `roll` is a uniform draw
    /// from [0, 1).
    pub fn generate(
        &mut self,
        dt_ms: u64,
        loot_count: usize,
        looter_count: usize,
        roll: f64,
    ) -> usize {
        self.time_without_loot_secs += dt_ms as f64 / 1000.0;

        let shortage = looter_count.saturating_sub(loot_count);
        if shortage == 0 || self.period_secs <= 0.0 {
            return 0;
        }

        let ratio = self.time_without_loot_secs / self.period_secs;
        let probability =
            ((1.0 - (1.0 - self.probability).powf(ratio)) * roll).clamp(0.0, 1.0);
        let generated = (shortage as f64 * probability).round() as usize;
        if generated > 0 {
            self.time_without_loot_secs = 0.0;
        }
        generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(period: f64, probability: f64) -> LootGenerator {
        LootGenerator::new(LootGeneratorConfig {
            period,
            probability,
        })
    }

    #[test]
    fn never_spawns_past_the_looter_count() {
        let mut gen = generator(1.0, 1.0);
        for loot_count in 0..5 {
            let spawned = gen.generate(10_000, loot_count, 4, 1.0);
            assert!(loot_count + spawned <= 4);
        }
    }

    #[test]
    fn no_shortage_means_no_spawn() {
        let mut gen = generator(1.0, 1.0);
        assert_eq!(gen.generate(10_000, 3, 3, 1.0), 0);
        assert_eq!(gen.generate(10_000, 5, 3, 1.0), 0);
    }

    #[test]
    fn probability_one_fills_every_slot_after_one_period() {
        let mut gen = generator(5.0, 1.0);
        assert_eq!(gen.generate(5_000, 0, 3, 1.0), 3);
    }

    #[test]
    fn zero_roll_spawns_nothing_and_keeps_accumulating() {
        let mut gen = generator(5.0, 1.0);
        assert_eq!(gen.generate(5_000, 0, 3, 0.0), 0);
        // The accumulated time was not reset, so the next window is two
        // periods long and still certain with p = 1.
        assert_eq!(gen.generate(5_000, 0, 3, 1.0), 3);
    }

    #[test]
    fn spawn_resets_the_accumulator() {
        let mut gen = generator(5.0, 0.5);
        assert!(gen.generate(50_000, 0, 4, 1.0) > 0);
        // Immediately after a spawn the window restarts near zero.
        assert_eq!(gen.generate(0, 0, 4, 1.0), 0);
    }
}
