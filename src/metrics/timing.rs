use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Source of every token in the process. Shared across trackers so a token
/// issued by one decorator never matches an entry in another.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Opaque handle identifying one dequeued message attempt.
///
/// Tokens are handed out once per dequeue and are unique within the process,
/// so two envelopes wrapping equal payloads still time independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimingToken(u64);

impl fmt::Display for TimingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Start instants of in-flight message attempts.
///
/// Entries are removed when the attempt finishes. There is no time-based
/// eviction: a message that is dequeued and never finished keeps its entry
/// for the tracker's lifetime.
#[derive(Debug, Default)]
pub struct TimingTracker {
    started: DashMap<TimingToken, Instant>,
}

impl TimingTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an attempt and return its token
    pub fn start(&self) -> TimingToken {
        let token = TimingToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
        self.started.insert(token, Instant::now());
        token
    }

    /// Remove the attempt's entry and return how long it was in flight.
    /// Returns `None` if the token was never started or already finished.
    pub fn finish(&self, token: TimingToken) -> Option<Duration> {
        self.started
            .remove(&token)
            .map(|(_, started)| started.elapsed())
    }

    /// Whether an attempt is still being timed
    pub fn contains(&self, token: TimingToken) -> bool {
        self.started.contains_key(&token)
    }

    /// Number of attempts currently in flight
    pub fn len(&self) -> usize {
        self.started.len()
    }

    /// Whether no attempt is in flight
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

/// Milliseconds rounded to one decimal place
pub fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 10_000.0).round() / 10.0
}
