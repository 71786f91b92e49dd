//! Windowed HTTP counters shared by app and route stats.

use crate::core::{HttpEvent, SharedClock};
use crate::metrics::{SlidingWindowAverage, SlidingWindowCounter};
use std::sync::Arc;
use std::time::Duration;

/// Point-in-time readout of [`HttpStats`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HttpSnapshot {
    /// Requests inside the window
    pub requests: usize,
    /// Requests per second averaged over the window
    pub rps: f64,
    pub status_2xx: usize,
    pub status_3xx: usize,
    pub status_4xx: usize,
    pub status_5xx: usize,
    /// Mean response time in milliseconds, `None` when the window is empty
    pub avg_response_ms: Option<f64>,
}

/// Request counters per status class plus a response time average.
#[derive(Debug)]
pub struct HttpStats {
    window: Duration,
    all: SlidingWindowCounter,
    status_2xx: SlidingWindowCounter,
    status_3xx: SlidingWindowCounter,
    status_4xx: SlidingWindowCounter,
    status_5xx: SlidingWindowCounter,
    response_time: SlidingWindowAverage,
}

impl HttpStats {
    pub fn new(window: Duration, clock: &SharedClock) -> Self {
        let counter = || SlidingWindowCounter::new(window, Arc::clone(clock));
        Self {
            window,
            all: counter(),
            status_2xx: counter(),
            status_3xx: counter(),
            status_4xx: counter(),
            status_5xx: counter(),
            response_time: SlidingWindowAverage::new(window, Arc::clone(clock)),
        }
    }

    /// Record one HTTP event
    pub fn record(&self, event: &HttpEvent) {
        self.all.increment();
        match event.status_class() {
            Some(2) => self.status_2xx.increment(),
            Some(3) => self.status_3xx.increment(),
            Some(4) => self.status_4xx.increment(),
            Some(5) => self.status_5xx.increment(),
            _ => {},
        }
        self.response_time.track(event.response_time.as_secs_f64() * 1000.0);
    }

    pub fn snapshot(&self) -> HttpSnapshot {
        let requests = self.all.rate();
        HttpSnapshot {
            requests,
            rps: requests as f64 / self.window.as_secs_f64(),
            status_2xx: self.status_2xx.rate(),
            status_3xx: self.status_3xx.rate(),
            status_4xx: self.status_4xx.rate(),
            status_5xx: self.status_5xx.rate(),
            avg_response_ms: self.response_time.average_opt(),
        }
    }
}
