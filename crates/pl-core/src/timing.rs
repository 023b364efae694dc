//! Staleness clock for cached remote results.
//!
//! A `RefreshableTimer` remembers when its owner last sampled a source and
//! reports how old that sample is. It is not synchronized; owners serialize
//! access (the BOM keeps its timer under the same lock as its rows).

use std::time::{Duration, Instant};

/// Records a sample time and reports the elapsed age since then.
#[derive(Debug, Clone, Copy)]
pub struct RefreshableTimer {
    sampled_at: Instant,
}

impl Default for RefreshableTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshableTimer {
    /// Create a timer whose first sample is "now".
    pub fn new() -> Self {
        Self {
            sampled_at: Instant::now(),
        }
    }

    /// Record "now" as the latest sample.
    pub fn sample(&mut self) {
        self.sample_at(Instant::now());
    }

    /// Record an explicit sample instant.
    pub fn sample_at(&mut self, at: Instant) {
        self.sampled_at = at;
    }

    /// Instant of the latest sample (construction time if never sampled).
    pub fn sampled_at(&self) -> Instant {
        self.sampled_at
    }

    /// Elapsed time since the latest sample.
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }

    /// Age relative to `now`; zero if `now` precedes the sample.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.sampled_at)
    }

    /// Whether the latest sample is older than `max_age`.
    pub fn is_older_than(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}
