#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic reinforcement system that emits monster spawn commands.
//!
//! The system accumulates simulated time from [`Event::TimeAdvanced`] and
//! proposes one spawn per elapsed interval, choosing a random cell from the
//! eligible candidates the session reports. Eligibility is re-validated by
//! the session on apply, so a proposal that went stale within the tick is
//! simply skipped and retried on the next interval.

use std::time::Duration;

use donut_panic_core::{CellCoord, Command, Event, MonsterBreed};
use sha2::{Digest, Sha256};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Interval between reinforcement attempts unless configured otherwise.
pub const DEFAULT_REINFORCEMENT_INTERVAL: Duration = Duration::from_secs(8);

/// Configuration parameters required to construct the reinforcement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }

    /// Derives a configuration whose RNG stream is unique per level.
    ///
    /// The seed mixes the session seed with the level name through SHA-256
    /// so that replaying the same level with the same session seed yields
    /// the same reinforcement schedule.
    #[must_use]
    pub fn seeded_for_level(spawn_interval: Duration, session_seed: u64, level_name: &str) -> Self {
        Self {
            spawn_interval,
            rng_seed: derive_labeled_seed(session_seed, level_name),
        }
    }
}

/// Pure system that deterministically emits reinforcement spawn commands.
#[derive(Debug)]
pub struct Reinforcement {
    spawn_interval: Duration,
    accumulator: Duration,
    rng_state: u64,
}

impl Reinforcement {
    /// Creates a new reinforcement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes events and spawn candidates to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], candidates: &[CellCoord], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                Event::LevelLoaded { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();

        for _ in 0..spawn_attempts {
            // An attempt with no eligible cell is skipped, not banked.
            let Some(cell) = self.select_candidate(candidates) else {
                continue;
            };
            out.push(Command::SpawnMonster {
                cell,
                breed: MonsterBreed::Normal,
            });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn select_candidate(&mut self, candidates: &[CellCoord]) -> Option<CellCoord> {
        if candidates.is_empty() {
            return None;
        }
        let value = self.advance_rng();
        let index = (value % candidates.len() as u64) as usize;
        Some(candidates[index])
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advanced(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn no_attempt_before_the_interval_elapses() {
        let mut system = Reinforcement::new(Config::new(Duration::from_secs(8), 1));
        let candidates = [CellCoord::new(3, 3)];
        let mut out = Vec::new();

        system.handle(&advanced(Duration::from_secs(7)), &candidates, &mut out);
        assert!(out.is_empty());

        system.handle(&advanced(Duration::from_secs(1)), &candidates, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_candidates_skip_the_attempt_without_banking_it() {
        let mut system = Reinforcement::new(Config::new(Duration::from_secs(2), 1));
        let mut out = Vec::new();

        system.handle(&advanced(Duration::from_secs(2)), &[], &mut out);
        assert!(out.is_empty());

        // The next interval produces exactly one attempt, not two.
        system.handle(
            &advanced(Duration::from_secs(2)),
            &[CellCoord::new(1, 1)],
            &mut out,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn zero_interval_disables_spawning() {
        let mut system = Reinforcement::new(Config::new(Duration::ZERO, 1));
        let mut out = Vec::new();
        system.handle(
            &advanced(Duration::from_secs(60)),
            &[CellCoord::new(0, 0)],
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn level_load_resets_the_accumulator() {
        let mut system = Reinforcement::new(Config::new(Duration::from_secs(4), 1));
        let candidates = [CellCoord::new(5, 5)];
        let mut out = Vec::new();

        system.handle(&advanced(Duration::from_secs(3)), &candidates, &mut out);
        system.handle(
            &[Event::LevelLoaded {
                name: "next".to_owned(),
            }],
            &candidates,
            &mut out,
        );
        system.handle(&advanced(Duration::from_secs(3)), &candidates, &mut out);

        assert!(out.is_empty(), "progress from the previous level is gone");
    }

    #[test]
    fn identical_seeds_pick_identical_cells() {
        let candidates: Vec<CellCoord> = (0..16).map(|index| CellCoord::new(index, 0)).collect();
        let config = Config::seeded_for_level(Duration::from_secs(1), 7, "stage");

        let mut first = Reinforcement::new(config);
        let mut second = Reinforcement::new(config);
        let mut first_out = Vec::new();
        let mut second_out = Vec::new();
        for _ in 0..5 {
            first.handle(&advanced(Duration::from_secs(1)), &candidates, &mut first_out);
            second.handle(
                &advanced(Duration::from_secs(1)),
                &candidates,
                &mut second_out,
            );
        }

        assert_eq!(first_out, second_out);
        assert_eq!(first_out.len(), 5);
    }

    #[test]
    fn different_levels_shift_the_schedule() {
        let seed_a = Config::seeded_for_level(Duration::from_secs(1), 7, "stage-a");
        let seed_b = Config::seeded_for_level(Duration::from_secs(1), 7, "stage-b");
        let candidates: Vec<CellCoord> = (0..64).map(|index| CellCoord::new(index, 0)).collect();

        let mut first = Reinforcement::new(seed_a);
        let mut second = Reinforcement::new(seed_b);
        let mut first_out = Vec::new();
        let mut second_out = Vec::new();
        for _ in 0..8 {
            first.handle(&advanced(Duration::from_secs(1)), &candidates, &mut first_out);
            second.handle(
                &advanced(Duration::from_secs(1)),
                &candidates,
                &mut second_out,
            );
        }

        assert_ne!(first_out, second_out);
    }
}
