//! Backpressure gate for high-frequency events.
//!
//! A date slider can emit one change per drag frame; each accepted
//! change costs a full aggregation round-trip. The gate accepts at most
//! one event per interval — not a correctness requirement, purely a
//! bound on query volume.

use std::time::{Duration, Instant};

/// Accepts at most one event per interval.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Creates a gate with the given minimum spacing.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns whether the caller should process this event, arming the
    /// gate when it does.
    pub fn accept(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(prev) if now.duration_since(prev) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
