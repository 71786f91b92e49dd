//! Sliding-window event rate tracker.
//!
//! Each tracked event costs one queue slot for as long as it stays inside the
//! trailing window. Eviction happens from the queue head on every operation,
//! so every timestamp is pushed once and popped once.

use crate::core::SharedClock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Counts events seen within a trailing time window.
///
/// Written by the ingestion path and read by the refresh path; a single mutex
/// per instance guards eviction and mutation together.
#[derive(Debug)]
pub struct SlidingWindowCounter {
    window: Duration,
    clock: SharedClock,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowCounter {
    /// Create a counter over `window` using `clock` as its time source
    pub fn new(window: Duration, clock: SharedClock) -> Self {
        Self {
            window,
            clock,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Record one event at the current instant
    pub fn increment(&self) {
        let mut timestamps = self.timestamps.lock();
        // read under the lock so pushes stay in clock order across threads
        let now = self.clock.now();
        evict_before(&mut timestamps, now, self.window);
        debug_assert!(timestamps.back().map_or(true, |last| *last <= now));
        timestamps.push_back(now);
    }

    /// Number of events inside the trailing window
    pub fn rate(&self) -> usize {
        let mut timestamps = self.timestamps.lock();
        if timestamps.is_empty() {
            return 0;
        }
        let now = self.clock.now();
        evict_before(&mut timestamps, now, self.window);
        timestamps.len()
    }

    /// Configured trailing window
    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Pop every head entry older than `now - window`.
#[inline]
pub(crate) fn evict_before(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    let Some(cutoff) = now.checked_sub(window) else {
        return;
    };
    while let Some(oldest) = timestamps.front() {
        if *oldest >= cutoff {
            break;
        }
        timestamps.pop_front();
    }
}
