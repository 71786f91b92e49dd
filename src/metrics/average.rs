//! Sliding-window count and mean tracker.

use crate::core::SharedClock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Returned by [`SlidingWindowAverage::average`] when the window holds no samples.
pub const NO_DATA: f64 = -1.0;

#[derive(Debug, Default)]
struct AverageState {
    // Timestamp and value share one slot, so the two sequences cannot diverge.
    samples: VecDeque<(Instant, f64)>,
    sum: f64,
}

impl AverageState {
    fn evict(&mut self, now: Instant, window: Duration) {
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while let Some(&(at, value)) = self.samples.front() {
            if at >= cutoff {
                break;
            }
            self.samples.pop_front();
            self.sum -= value;
        }
        if self.samples.is_empty() {
            // drop accumulated float error
            self.sum = 0.0;
        }
    }
}

/// Tracks sample count and running sum over a trailing window.
#[derive(Debug)]
pub struct SlidingWindowAverage {
    window: Duration,
    clock: SharedClock,
    state: Mutex<AverageState>,
}

impl SlidingWindowAverage {
    /// Create a tracker over `window` using `clock` as its time source
    pub fn new(window: Duration, clock: SharedClock) -> Self {
        Self {
            window,
            clock,
            state: Mutex::new(AverageState::default()),
        }
    }

    /// Record `value` at the current instant
    pub fn track(&self, value: f64) {
        let mut state = self.state.lock();
        // read under the lock so samples stay in clock order across threads
        let now = self.clock.now();
        state.samples.push_back((now, value));
        state.sum += value;
        state.evict(now, self.window);
    }

    /// Number of samples inside the window
    pub fn rate(&self) -> usize {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.evict(now, self.window);
        state.samples.len()
    }

    /// Mean of the samples inside the window, or [`NO_DATA`] when empty
    pub fn average(&self) -> f64 {
        self.average_opt().unwrap_or(NO_DATA)
    }

    /// Mean of the samples inside the window
    pub fn average_opt(&self) -> Option<f64> {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.evict(now, self.window);
        if state.samples.is_empty() {
            return None;
        }
        Some(state.sum / state.samples.len() as f64)
    }

    /// Configured trailing window
    pub fn window(&self) -> Duration {
        self.window
    }
}
