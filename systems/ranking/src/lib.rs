#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Completion-time ranking system.
//!
//! The system reacts to [`Event::LevelCleared`] by submitting the run's
//! time to a [`ScoreStore`] and keeping the awarded rank for presentation.
//! Stores own persistence entirely; the simulation never waits on them and
//! a rank only ever updates externally-observed state.

use std::time::Duration;

use donut_panic_core::Event;

/// Number of entries a ranking table retains.
pub const MAX_ENTRIES: usize = 10;

/// One recorded completion time.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    /// Level the run was completed on.
    pub level: String,
    /// Completion time in seconds.
    pub seconds: f32,
}

/// Destination for completed runs.
///
/// Implementations may persist locally, remotely, or not at all; `submit`
/// returns the 1-based rank the time achieved, or zero when it fell off
/// the table.
pub trait ScoreStore {
    /// Records a completion time and reports the rank it achieved.
    fn submit(&mut self, level: &str, seconds: f32) -> u32;

    /// Current table, fastest first.
    fn entries(&self) -> &[ScoreEntry];
}

/// In-memory [`ScoreStore`] holding the top [`MAX_ENTRIES`] times.
#[derive(Debug, Default)]
pub struct LocalScores {
    entries: Vec<ScoreEntry>,
}

impl LocalScores {
    /// Creates an empty score table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for LocalScores {
    fn submit(&mut self, level: &str, seconds: f32) -> u32 {
        let position = self
            .entries
            .iter()
            .position(|entry| seconds < entry.seconds)
            .unwrap_or(self.entries.len());

        if position >= MAX_ENTRIES {
            return 0;
        }

        self.entries.insert(
            position,
            ScoreEntry {
                level: level.to_owned(),
                seconds,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        (position + 1) as u32
    }

    fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }
}

/// Pure system bridging cleared levels to a score store.
#[derive(Debug, Default)]
pub struct Ranking {
    last_rank: Option<u32>,
}

impl Ranking {
    /// Creates a ranking system with no recorded rank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes events, submitting any completed run to the store.
    pub fn handle(&mut self, events: &[Event], level_name: &str, store: &mut dyn ScoreStore) {
        for event in events {
            if let Event::LevelCleared { elapsed } = event {
                let rank = store.submit(level_name, elapsed.as_secs_f32());
                self.last_rank = Some(rank);
            }
        }
    }

    /// Rank achieved by the most recent cleared run, if any.
    ///
    /// Zero means the run did not make the table.
    #[must_use]
    pub fn last_rank(&self) -> Option<u32> {
        self.last_rank
    }
}

/// Formats a completion time as `M:SS.d`.
#[must_use]
pub fn format_time(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f32();
    let minutes = (seconds / 60.0).floor() as u32;
    let whole_seconds = (seconds % 60.0).floor() as u32;
    let tenths = ((seconds % 1.0) * 10.0).floor() as u32;
    format!("{minutes}:{whole_seconds:02}.{tenths}")
}
