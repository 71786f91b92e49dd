//! Routes incoming events to the per-app, per-host and per-agent trackers.

use super::app::AppStats;
use super::route::HostStats;
use super::rows::{AppRow, HostRow, RouteRow, UserAgentRow};
use super::user_agent::UserAgentStats;
use crate::core::{AppId, Config, Event, SharedClock};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Counts removed by one [`EventProcessor::prune_stale`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub apps: usize,
    pub hosts: usize,
    pub containers: usize,
    pub user_agents: usize,
}

/// Owner of all live statistics.
#[derive(Debug)]
pub struct EventProcessor {
    window: Duration,
    app_timeout: Duration,
    container_timeout: Duration,
    clock: SharedClock,
    apps: DashMap<AppId, Arc<AppStats>>,
    hosts: DashMap<String, Arc<HostStats>>,
    user_agents: UserAgentStats,
    processed: AtomicU64,
}

impl EventProcessor {
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        Self {
            window: config.window.rate_window,
            app_timeout: config.stats.app_timeout,
            container_timeout: config.stats.container_timeout,
            user_agents: UserAgentStats::new(
                config.window.rate_window,
                Arc::clone(&clock),
                config.stats.max_user_agents,
            ),
            clock,
            apps: DashMap::new(),
            hosts: DashMap::new(),
            processed: AtomicU64::new(0),
        }
    }

    fn app(&self, app_id: &AppId) -> Arc<AppStats> {
        if let Some(stats) = self.apps.get(app_id) {
            return Arc::clone(stats.value());
        }
        Arc::clone(
            self.apps
                .entry(app_id.clone())
                .or_insert_with(|| Arc::new(AppStats::new(app_id.clone(), self.window, Arc::clone(&self.clock))))
                .value(),
        )
    }

    fn host(&self, host: &str) -> Arc<HostStats> {
        if let Some(stats) = self.hosts.get(host) {
            return Arc::clone(stats.value());
        }
        Arc::clone(
            self.hosts
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(HostStats::new(host, self.window, Arc::clone(&self.clock))))
                .value(),
        )
    }

    /// Register an application and its display name
    pub fn register_app(&self, app_id: AppId, name: impl Into<String>) {
        let name = name.into();
        debug!(app_id = %app_id, name = %name, "registering app");
        self.app(&app_id).set_name(name);
    }

    /// Register a route prefix on `host`, optionally owned by an app
    pub fn register_route(&self, host: &str, path: &str, app_id: Option<AppId>) {
        let host = host.to_ascii_lowercase();
        debug!(host = %host, path, "registering route");
        self.host(&host).register_route(path, app_id);
    }

    /// Forget an application and every route it owns
    pub fn remove_app(&self, app_id: &AppId) -> bool {
        let removed = self.apps.remove(app_id).is_some();
        let routes: usize = self.hosts.iter().map(|h| h.value().remove_app_routes(app_id)).sum();
        if removed || routes > 0 {
            info!(app_id = %app_id, routes, "removed app");
        }
        removed
    }

    /// Fold one event into the statistics
    pub fn process(&self, event: &Event) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        trace!(kind = event.kind(), app_id = %event.app_id(), "processing event");
        match event {
            Event::Http(http) => {
                self.app(&http.app_id).record_http(http);
                self.host(&http.host.to_ascii_lowercase()).record(http);
                self.user_agents.record(http.user_agent.as_deref());
            },
            Event::Log(log) => self.app(&log.app_id).record_log(log),
            Event::ContainerMetric(metric) => self.app(&metric.app_id).record_container_metric(metric),
        }
    }

    /// Total events processed since start
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Drop apps and hosts silent for longer than the app timeout, and
    /// instances silent for longer than the container timeout
    pub fn prune_stale(&self) -> PruneReport {
        let now = self.clock.now();
        let mut report = PruneReport::default();

        let apps_before = self.apps.len();
        self.apps
            .retain(|_, app| now.saturating_duration_since(app.last_seen()) <= self.app_timeout);
        report.apps = apps_before - self.apps.len();

        // Hosts with registered routes stay; they are part of the topology.
        let hosts_before = self.hosts.len();
        self.hosts.retain(|_, host| {
            host.route_count() > 0 || now.saturating_duration_since(host.last_seen()) <= self.app_timeout
        });
        report.hosts = hosts_before - self.hosts.len();

        report.containers = self
            .apps
            .iter()
            .map(|app| app.value().prune_containers(self.container_timeout))
            .sum();
        report.user_agents = self.user_agents.prune_idle();

        if report != PruneReport::default() {
            debug!(?report, "pruned stale statistics");
        }
        report
    }

    fn app_name(&self, app_id: Option<&AppId>) -> String {
        app_id
            .map(|id| self.apps.get(id).map_or_else(|| id.to_string(), |app| app.name()))
            .unwrap_or_default()
    }

    pub fn app_rows(&self) -> Vec<Arc<AppRow>> {
        self.apps
            .iter()
            .map(|app| Arc::new(AppRow::from(app.value().snapshot())))
            .collect()
    }

    pub fn route_rows(&self) -> Vec<Arc<RouteRow>> {
        let hosts: Vec<Arc<HostStats>> = self.hosts.iter().map(|h| Arc::clone(h.value())).collect();
        hosts
            .iter()
            .flat_map(|host| host.route_snapshots())
            .map(|snap| {
                let app = self.app_name(snap.app_id.as_ref());
                Arc::new(RouteRow::new(snap, app))
            })
            .collect()
    }

    pub fn host_rows(&self) -> Vec<Arc<HostRow>> {
        self.hosts
            .iter()
            .map(|host| {
                let http = host.value().snapshot();
                Arc::new(HostRow {
                    host: host.key().clone(),
                    routes: host.value().route_count() as f64,
                    requests: http.requests as f64,
                    rps: http.rps,
                    status_5xx: http.status_5xx as f64,
                    avg_response_ms: http.avg_response_ms,
                })
            })
            .collect()
    }

    pub fn user_agent_rows(&self) -> Vec<Arc<UserAgentRow>> {
        self.user_agents
            .snapshot()
            .into_iter()
            .map(|(user_agent, requests)| {
                Arc::new(UserAgentRow {
                    user_agent,
                    requests: requests as f64,
                })
            })
            .collect()
    }
}
