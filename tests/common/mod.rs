//! Common test utilities and fixtures.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use firetop_lib::core::{AppId, ConfigBuilder, Event, HttpEvent, ManualClock, SharedClock};
use firetop_lib::stats::EventProcessor;

/// Test fixture builder for HTTP events with sensible defaults.
pub struct TestHttpBuilder {
    app: String,
    host: String,
    path: String,
    status_code: u16,
    response_ms: u64,
    user_agent: Option<String>,
}

impl TestHttpBuilder {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            host: "shop.example.com".to_string(),
            path: "/".to_string(),
            status_code: 200,
            response_ms: 10,
            user_agent: None,
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn response_ms(mut self, ms: u64) -> Self {
        self.response_ms = ms;
        self
    }

    pub fn user_agent(mut self, agent: &str) -> Self {
        self.user_agent = Some(agent.to_string());
        self
    }

    pub fn build(self) -> Event {
        Event::Http(HttpEvent {
            app_id: AppId::new(self.app).unwrap(),
            instance_index: 0,
            host: self.host,
            path: self.path,
            method: "GET".to_string(),
            status_code: self.status_code,
            response_time: Duration::from_millis(self.response_ms),
            user_agent: self.user_agent,
            remote_address: None,
        })
    }
}

/// Processor with default config driven by a manual clock.
pub fn manual_processor() -> (Arc<ManualClock>, EventProcessor) {
    let clock = ManualClock::new();
    let config = ConfigBuilder::new().build().unwrap();
    let processor = EventProcessor::new(&config, Arc::clone(&clock) as SharedClock);
    (clock, processor)
}

pub fn app_id(id: &str) -> AppId {
    AppId::new(id).unwrap()
}
