//! End-to-end event processing: events in, table rows out.

mod common;

use std::time::Duration;
use common::{app_id, manual_processor, TestHttpBuilder};
use firetop_lib::core::ViewMode;
use firetop_lib::dashboard::Dashboard;
use firetop_lib::stats::{OTHER_USER_AGENTS, UNKNOWN_USER_AGENT};
use pretty_assertions::assert_eq;

#[test]
fn test_window_expiry_drops_counts() {
    let (clock, processor) = manual_processor();
    processor.register_app(app_id("web"), "web");
    for ms in [10, 20, 30] {
        processor.process(&TestHttpBuilder::new("web").response_ms(ms).build());
    }

    let row = &processor.app_rows()[0];
    assert_eq!(row.requests, 3.0);
    assert!((row.avg_response_ms.unwrap() - 20.0).abs() < 1e-9);
    assert!((row.rps - 0.05).abs() < 1e-9);

    clock.advance(Duration::from_secs(61));
    let row = &processor.app_rows()[0];
    assert_eq!(row.requests, 0.0);
    assert_eq!(row.avg_response_ms, None);
}

#[test]
fn test_status_classes() {
    let (_clock, processor) = manual_processor();
    for status in [200, 201, 301, 404, 418, 500, 100] {
        processor.process(&TestHttpBuilder::new("web").status(status).build());
    }
    let row = &processor.app_rows()[0];
    assert_eq!(row.requests, 7.0);
    assert_eq!(
        (row.status_2xx, row.status_3xx, row.status_4xx, row.status_5xx),
        (2.0, 1.0, 2.0, 1.0)
    );
}

#[test]
fn test_user_agent_buckets() {
    let (_clock, processor) = manual_processor();
    processor.process(&TestHttpBuilder::new("web").user_agent("curl/8.0").build());
    processor.process(&TestHttpBuilder::new("web").user_agent("curl/8.0").build());
    processor.process(&TestHttpBuilder::new("web").build());

    let mut rows: Vec<(String, f64)> = processor
        .user_agent_rows()
        .iter()
        .map(|r| (r.user_agent.clone(), r.requests))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        rows,
        vec![
            (UNKNOWN_USER_AGENT.to_string(), 1.0),
            ("curl/8.0".to_string(), 2.0),
        ]
    );
    assert_ne!(OTHER_USER_AGENTS, UNKNOWN_USER_AGENT);
}

#[test]
fn test_dashboard_views_follow_processor() {
    let (_clock, processor) = manual_processor();
    for (app, count) in [("a", 1), ("b", 4), ("c", 2)] {
        for _ in 0..count {
            processor.process(&TestHttpBuilder::new(app).host(&format!("{app}.example.com")).build());
        }
    }

    let mut dashboard = Dashboard::new(ViewMode::Hosts);
    let summary = dashboard.refresh(&processor);
    assert_eq!(summary.total, 3);
    let hosts: Vec<String> = dashboard.hosts().displayed().iter().map(|r| r.host.clone()).collect();
    assert_eq!(hosts, vec!["b.example.com", "c.example.com", "a.example.com"]);

    dashboard
        .apply_filters(&[("host".to_string(), "^[ab]\\.".to_string())])
        .unwrap();
    let hosts: Vec<String> = dashboard.hosts().displayed().iter().map(|r| r.host.clone()).collect();
    assert_eq!(hosts, vec!["b.example.com", "a.example.com"]);

    // filters belong to their view
    dashboard.set_view(ViewMode::Apps).unwrap();
    assert_eq!(dashboard.apps().displayed().len(), 3);
}

#[test]
fn test_prune_keeps_registered_hosts() {
    let (clock, processor) = manual_processor();
    processor.register_route("kept.example.com", "/api", None);
    processor.process(&TestHttpBuilder::new("web").host("kept.example.com").build());
    processor.process(&TestHttpBuilder::new("web").host("gone.example.com").build());

    clock.advance(Duration::from_secs(11 * 60));
    let report = processor.prune_stale();
    assert_eq!(report.hosts, 1);
    assert_eq!(report.apps, 1);
    assert_eq!(processor.host_count(), 1);
    assert_eq!(processor.host_rows()[0].host, "kept.example.com");
}
