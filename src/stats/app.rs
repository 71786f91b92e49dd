//! Per-application statistics.

use super::http::{HttpSnapshot, HttpStats};
use crate::core::{AppId, ContainerMetricEvent, HttpEvent, LogEvent, LogStream, SharedClock};
use crate::metrics::SlidingWindowCounter;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Latest container metrics reported by one app instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSnapshot {
    pub cpu_percentage: f64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
    pub last_seen: Instant,
}

/// Point-in-time readout of [`AppStats`]
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub app_id: AppId,
    pub name: String,
    pub http: HttpSnapshot,
    pub log_out: usize,
    pub log_err: usize,
    pub instances: usize,
    pub cpu_percentage: f64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
}

/// Statistics for one application.
#[derive(Debug)]
pub struct AppStats {
    app_id: AppId,
    name: RwLock<String>,
    clock: SharedClock,
    http: HttpStats,
    log_out: SlidingWindowCounter,
    log_err: SlidingWindowCounter,
    containers: Mutex<BTreeMap<u32, ContainerSnapshot>>,
    last_seen: Mutex<Instant>,
}

impl AppStats {
    pub fn new(app_id: AppId, window: Duration, clock: SharedClock) -> Self {
        let now = clock.now();
        Self {
            name: RwLock::new(app_id.to_string()),
            app_id,
            http: HttpStats::new(window, &clock),
            log_out: SlidingWindowCounter::new(window, Arc::clone(&clock)),
            log_err: SlidingWindowCounter::new(window, Arc::clone(&clock)),
            containers: Mutex::new(BTreeMap::new()),
            last_seen: Mutex::new(now),
            clock,
        }
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Display name; defaults to the app id until discovery reports one
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Instant of the last event for this app
    pub fn last_seen(&self) -> Instant {
        *self.last_seen.lock()
    }

    fn touch(&self) -> Instant {
        let now = self.clock.now();
        *self.last_seen.lock() = now;
        now
    }

    pub fn record_http(&self, event: &HttpEvent) {
        self.touch();
        self.http.record(event);
    }

    pub fn record_log(&self, event: &LogEvent) {
        self.touch();
        match event.stream {
            LogStream::Out => self.log_out.increment(),
            LogStream::Err => self.log_err.increment(),
        }
    }

    pub fn record_container_metric(&self, event: &ContainerMetricEvent) {
        let now = self.touch();
        self.containers.lock().insert(
            event.instance_index,
            ContainerSnapshot {
                cpu_percentage: event.cpu_percentage,
                memory_bytes: event.memory_bytes,
                disk_bytes: event.disk_bytes,
                last_seen: now,
            },
        );
    }

    /// Drop instances that stopped reporting; returns how many were removed
    pub fn prune_containers(&self, timeout: Duration) -> usize {
        let now = self.clock.now();
        let mut containers = self.containers.lock();
        let before = containers.len();
        containers.retain(|_, c| now.saturating_duration_since(c.last_seen) <= timeout);
        before - containers.len()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let (instances, cpu_percentage, memory_bytes, disk_bytes) = {
            let containers = self.containers.lock();
            containers.values().fold(
                (containers.len(), 0.0, 0u64, 0u64),
                |(n, cpu, mem, disk), c| {
                    (n, cpu + c.cpu_percentage, mem + c.memory_bytes, disk + c.disk_bytes)
                },
            )
        };
        AppSnapshot {
            app_id: self.app_id.clone(),
            name: self.name(),
            http: self.http.snapshot(),
            log_out: self.log_out.rate(),
            log_err: self.log_err.rate(),
            instances,
            cpu_percentage,
            memory_bytes,
            disk_bytes,
        }
    }
}
