//! Immutable table rows captured once per refresh, and their column sets.
//!
//! Rows are plain values so a sort never observes a tracker changing under it.

use super::app::AppSnapshot;
use super::route::RouteSnapshot;
use crate::table::{ListColumn, SortColumn, SortDirection};

/// One application row
#[derive(Debug, Clone, PartialEq)]
pub struct AppRow {
    pub app_id: String,
    pub name: String,
    pub requests: f64,
    pub rps: f64,
    pub status_2xx: f64,
    pub status_3xx: f64,
    pub status_4xx: f64,
    pub status_5xx: f64,
    pub avg_response_ms: Option<f64>,
    pub log_out: f64,
    pub log_err: f64,
    pub instances: f64,
    pub cpu_percentage: f64,
    pub memory_bytes: f64,
    pub disk_bytes: f64,
}

impl From<AppSnapshot> for AppRow {
    fn from(snap: AppSnapshot) -> Self {
        Self {
            app_id: snap.app_id.to_string(),
            name: snap.name,
            requests: snap.http.requests as f64,
            rps: snap.http.rps,
            status_2xx: snap.http.status_2xx as f64,
            status_3xx: snap.http.status_3xx as f64,
            status_4xx: snap.http.status_4xx as f64,
            status_5xx: snap.http.status_5xx as f64,
            avg_response_ms: snap.http.avg_response_ms,
            log_out: snap.log_out as f64,
            log_err: snap.log_err as f64,
            instances: snap.instances as f64,
            cpu_percentage: snap.cpu_percentage,
            memory_bytes: snap.memory_bytes as f64,
            disk_bytes: snap.disk_bytes as f64,
        }
    }
}

/// One host + route row
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub host: String,
    pub route: String,
    pub app: String,
    pub requests: f64,
    pub rps: f64,
    pub status_2xx: f64,
    pub status_3xx: f64,
    pub status_4xx: f64,
    pub status_5xx: f64,
    pub avg_response_ms: Option<f64>,
}

impl RouteRow {
    /// Build a row; `app` is the resolved display name of the owning app
    pub fn new(snap: RouteSnapshot, app: String) -> Self {
        Self {
            host: snap.host,
            route: snap.route,
            app,
            requests: snap.http.requests as f64,
            rps: snap.http.rps,
            status_2xx: snap.http.status_2xx as f64,
            status_3xx: snap.http.status_3xx as f64,
            status_4xx: snap.http.status_4xx as f64,
            status_5xx: snap.http.status_5xx as f64,
            avg_response_ms: snap.http.avg_response_ms,
        }
    }
}

/// One host row
#[derive(Debug, Clone, PartialEq)]
pub struct HostRow {
    pub host: String,
    pub routes: f64,
    pub requests: f64,
    pub rps: f64,
    pub status_5xx: f64,
    pub avg_response_ms: Option<f64>,
}

/// One user agent row
#[derive(Debug, Clone, PartialEq)]
pub struct UserAgentRow {
    pub user_agent: String,
    pub requests: f64,
}

pub fn app_columns() -> Vec<ListColumn<AppRow>> {
    vec![
        ListColumn::alphanumeric("name", "APPLICATION", |r: &AppRow| r.name.as_str()),
        ListColumn::alphanumeric("app_id", "APP ID", |r: &AppRow| r.app_id.as_str()),
        ListColumn::numeric("requests", "REQS", |r: &AppRow| r.requests),
        ListColumn::numeric("rps", "RPS", |r: &AppRow| r.rps),
        ListColumn::numeric("2xx", "2XX", |r: &AppRow| r.status_2xx),
        ListColumn::numeric("3xx", "3XX", |r: &AppRow| r.status_3xx),
        ListColumn::numeric("4xx", "4XX", |r: &AppRow| r.status_4xx),
        ListColumn::numeric("5xx", "5XX", |r: &AppRow| r.status_5xx),
        ListColumn::optional_numeric("resp_ms", "RESP(ms)", |r: &AppRow| r.avg_response_ms),
        ListColumn::numeric("log_out", "LOGS", |r: &AppRow| r.log_out),
        ListColumn::numeric("log_err", "ERRLOGS", |r: &AppRow| r.log_err),
        ListColumn::numeric("instances", "INST", |r: &AppRow| r.instances),
        ListColumn::numeric("cpu", "CPU%", |r: &AppRow| r.cpu_percentage),
        ListColumn::numeric("memory", "MEM", |r: &AppRow| r.memory_bytes),
        ListColumn::numeric("disk", "DISK", |r: &AppRow| r.disk_bytes),
    ]
}

pub fn app_default_sort() -> Vec<SortColumn> {
    vec![
        SortColumn::new("requests", SortDirection::Descending),
        SortColumn::new("name", SortDirection::Ascending),
    ]
}

pub fn route_columns() -> Vec<ListColumn<RouteRow>> {
    vec![
        ListColumn::alphanumeric("host", "HOST", |r: &RouteRow| r.host.as_str()),
        ListColumn::alphanumeric("route", "ROUTE", |r: &RouteRow| r.route.as_str()),
        ListColumn::alphanumeric("app", "APPLICATION", |r: &RouteRow| r.app.as_str()),
        ListColumn::numeric("requests", "REQS", |r: &RouteRow| r.requests),
        ListColumn::numeric("rps", "RPS", |r: &RouteRow| r.rps),
        ListColumn::numeric("2xx", "2XX", |r: &RouteRow| r.status_2xx),
        ListColumn::numeric("3xx", "3XX", |r: &RouteRow| r.status_3xx),
        ListColumn::numeric("4xx", "4XX", |r: &RouteRow| r.status_4xx),
        ListColumn::numeric("5xx", "5XX", |r: &RouteRow| r.status_5xx),
        ListColumn::optional_numeric("resp_ms", "RESP(ms)", |r: &RouteRow| r.avg_response_ms),
    ]
}

pub fn route_default_sort() -> Vec<SortColumn> {
    vec![
        SortColumn::new("requests", SortDirection::Descending),
        SortColumn::new("host", SortDirection::Ascending),
        SortColumn::new("route", SortDirection::Ascending),
    ]
}

pub fn host_columns() -> Vec<ListColumn<HostRow>> {
    vec![
        ListColumn::alphanumeric("host", "HOST", |r: &HostRow| r.host.as_str()),
        ListColumn::numeric("routes", "ROUTES", |r: &HostRow| r.routes),
        ListColumn::numeric("requests", "REQS", |r: &HostRow| r.requests),
        ListColumn::numeric("rps", "RPS", |r: &HostRow| r.rps),
        ListColumn::numeric("5xx", "5XX", |r: &HostRow| r.status_5xx),
        ListColumn::optional_numeric("resp_ms", "RESP(ms)", |r: &HostRow| r.avg_response_ms),
    ]
}

pub fn host_default_sort() -> Vec<SortColumn> {
    vec![
        SortColumn::new("requests", SortDirection::Descending),
        SortColumn::new("host", SortDirection::Ascending),
    ]
}

pub fn user_agent_columns() -> Vec<ListColumn<UserAgentRow>> {
    vec![
        ListColumn::alphanumeric("user_agent", "USER AGENT", |r: &UserAgentRow| r.user_agent.as_str()),
        ListColumn::numeric("requests", "REQS", |r: &UserAgentRow| r.requests),
    ]
}

pub fn user_agent_default_sort() -> Vec<SortColumn> {
    vec![
        SortColumn::new("requests", SortDirection::Descending),
        SortColumn::new("user_agent", SortDirection::Ascending),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{find_column, CellValue};

    #[test]
    fn test_default_sorts_name_real_columns() {
        let apps = app_columns();
        assert!(app_default_sort().iter().all(|s| find_column(&apps, s.column).is_some()));
        let routes = route_columns();
        assert!(route_default_sort().iter().all(|s| find_column(&routes, s.column).is_some()));
        let hosts = host_columns();
        assert!(host_default_sort().iter().all(|s| find_column(&hosts, s.column).is_some()));
        let agents = user_agent_columns();
        assert!(user_agent_default_sort().iter().all(|s| find_column(&agents, s.column).is_some()));
    }

    #[test]
    fn test_column_ids_unique() {
        let apps = app_columns();
        let mut ids: Vec<_> = apps.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), apps.len());
    }

    #[test]
    fn test_missing_response_time_is_empty_cell() {
        let row = HostRow {
            host: "idle.example.com".to_string(),
            routes: 1.0,
            requests: 0.0,
            rps: 0.0,
            status_5xx: 0.0,
            avg_response_ms: None,
        };
        let columns = host_columns();
        let resp = find_column(&columns, "resp_ms").unwrap();
        assert_eq!(resp.value(&row), CellValue::Empty);
    }
}
