//! Per-host route statistics with path attribution.

use super::http::{HttpSnapshot, HttpStats};
use crate::core::{AppId, HttpEvent, SharedClock};
use crate::routes::RouteAttributor;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Route label used for requests no registered route claims.
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Point-in-time readout of [`RouteStats`]
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSnapshot {
    pub host: String,
    pub route: String,
    pub app_id: Option<AppId>,
    pub http: HttpSnapshot,
}

/// HTTP statistics for one host + route prefix.
#[derive(Debug)]
pub struct RouteStats {
    host: String,
    route: String,
    app_id: Option<AppId>,
    http: HttpStats,
}

impl RouteStats {
    fn new(host: &str, route: &str, app_id: Option<AppId>, window: Duration, clock: &SharedClock) -> Self {
        Self {
            host: host.to_string(),
            route: route.to_string(),
            app_id,
            http: HttpStats::new(window, clock),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn app_id(&self) -> Option<&AppId> {
        self.app_id.as_ref()
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            host: self.host.clone(),
            route: self.route.clone(),
            app_id: self.app_id.clone(),
            http: self.http.snapshot(),
        }
    }
}

/// Statistics for one host: its registered routes and an unmatched bucket.
#[derive(Debug)]
pub struct HostStats {
    host: String,
    window: Duration,
    clock: SharedClock,
    routes: RwLock<RouteAttributor<Arc<RouteStats>>>,
    unmatched: Arc<RouteStats>,
    http: HttpStats,
    last_seen: Mutex<Instant>,
}

impl HostStats {
    pub fn new(host: impl Into<String>, window: Duration, clock: SharedClock) -> Self {
        let host = host.into();
        let unmatched = Arc::new(RouteStats::new(&host, UNMATCHED_ROUTE, None, window, &clock));
        Self {
            http: HttpStats::new(window, &clock),
            last_seen: Mutex::new(clock.now()),
            routes: RwLock::new(RouteAttributor::new()),
            unmatched,
            host,
            window,
            clock,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Register a route prefix owned by `app_id`. Re-registering keeps the
    /// existing counters.
    pub fn register_route(&self, path: &str, app_id: Option<AppId>) {
        let mut routes = self.routes.write();
        let normalized = crate::routes::normalize_path(path);
        if let Some(existing) = routes.find_route(normalized) {
            if existing.prefix == normalized {
                return;
            }
        }
        let stats = Arc::new(RouteStats::new(&self.host, normalized, app_id, self.window, &self.clock));
        routes.register(normalized, stats);
    }

    /// Remove every route owned by `app_id`; returns how many were removed
    pub fn remove_app_routes(&self, app_id: &AppId) -> usize {
        let mut routes = self.routes.write();
        let owned: Vec<String> = routes
            .routes()
            .into_iter()
            .filter(|entry| entry.payload.app_id() == Some(app_id))
            .map(|entry| entry.prefix.clone())
            .collect();
        for prefix in &owned {
            routes.remove(prefix);
        }
        owned.len()
    }

    /// Route stats that would receive a request for `path`
    pub fn attribute(&self, path: &str) -> Arc<RouteStats> {
        match self.routes.read().find_route(path) {
            Some(entry) => Arc::clone(&entry.payload),
            None => {
                tracing::trace!(host = %self.host, path, "no route matched");
                Arc::clone(&self.unmatched)
            },
        }
    }

    /// Record an HTTP event on the host and its attributed route
    pub fn record(&self, event: &HttpEvent) {
        *self.last_seen.lock() = self.clock.now();
        self.http.record(event);
        self.attribute(&event.path).http.record(event);
    }

    pub fn last_seen(&self) -> Instant {
        *self.last_seen.lock()
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }

    pub fn snapshot(&self) -> HttpSnapshot {
        self.http.snapshot()
    }

    /// Snapshots of every registered route plus the unmatched bucket
    pub fn route_snapshots(&self) -> Vec<RouteSnapshot> {
        let routes = self.routes.read();
        let mut out: Vec<RouteSnapshot> = routes.routes().iter().map(|entry| entry.payload.snapshot()).collect();
        out.push(self.unmatched.snapshot());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;

    fn event(path: &str) -> HttpEvent {
        HttpEvent {
            app_id: AppId::new("app").unwrap(),
            instance_index: 0,
            host: "shop.example.com".to_string(),
            path: path.to_string(),
            method: "GET".to_string(),
            status_code: 200,
            response_time: Duration::from_millis(5),
            user_agent: None,
            remote_address: None,
        }
    }

    fn requests(host: &HostStats, route: &str) -> usize {
        host.route_snapshots()
            .into_iter()
            .find(|r| r.route == route)
            .map_or(0, |r| r.http.requests)
    }

    #[test]
    fn test_attribution_by_longest_route() {
        let clock: SharedClock = ManualClock::new();
        let host = HostStats::new("shop.example.com", Duration::from_secs(60), clock);
        host.register_route("/cart", Some(AppId::new("cart").unwrap()));
        host.register_route("/cart/checkout", Some(AppId::new("checkout").unwrap()));

        host.record(&event("/cart/items"));
        host.record(&event("/cart/checkout/pay"));
        host.record(&event("/cartx"));

        assert_eq!(requests(&host, "/cart"), 1);
        assert_eq!(requests(&host, "/cart/checkout"), 1);
        assert_eq!(requests(&host, UNMATCHED_ROUTE), 1);
        assert_eq!(host.snapshot().requests, 3);
    }

    #[test]
    fn test_reregister_keeps_counters() {
        let clock: SharedClock = ManualClock::new();
        let host = HostStats::new("h", Duration::from_secs(60), clock);
        host.register_route("/api", None);
        host.record(&event("/api/v1"));
        host.register_route("/api/", None);
        assert_eq!(host.route_count(), 1);
        assert_eq!(requests(&host, "/api"), 1);
    }

    #[test]
    fn test_remove_app_routes() {
        let clock: SharedClock = ManualClock::new();
        let host = HostStats::new("h", Duration::from_secs(60), clock);
        let app = AppId::new("a").unwrap();
        host.register_route("", Some(app.clone()));
        host.register_route("/b", Some(AppId::new("b").unwrap()));
        assert_eq!(host.remove_app_routes(&app), 1);
        assert_eq!(host.attribute("/x").route(), UNMATCHED_ROUTE);
        assert_eq!(host.attribute("/b/c").route(), "/b");
    }
}
