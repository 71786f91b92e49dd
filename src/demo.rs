//! Synthetic firehose for running without a platform connection.

use crate::core::{AppId, ContainerMetricEvent, Event, HttpEvent, LogEvent, LogStream, Result};
use crate::stats::EventProcessor;
use rand::{thread_rng, Rng};
use std::time::Duration;

/// One simulated application
#[derive(Debug, Clone)]
pub struct DemoApp {
    pub app_id: AppId,
    pub name: String,
    pub host: String,
    pub routes: Vec<&'static str>,
    pub instances: u32,
    /// Relative share of generated traffic
    pub weight: f64,
    pub error_rate: f64,
    pub base_latency_ms: u64,
}

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)",
    "curl/8.4.0",
    "Go-http-client/1.1",
    "kube-probe/1.28",
];

/// Generates HTTP, log and container events with realistic variation
#[derive(Debug)]
pub struct DemoGenerator {
    apps: Vec<DemoApp>,
    iteration: u64,
}

impl DemoGenerator {
    pub fn new() -> Result<Self> {
        let app = |id: &str, name: &str, host: &str, routes, instances, weight, error_rate, latency| {
            Ok::<_, crate::core::FiretopError>(DemoApp {
                app_id: AppId::new(id)?,
                name: name.to_string(),
                host: host.to_string(),
                routes,
                instances,
                weight,
                error_rate,
                base_latency_ms: latency,
            })
        };
        let apps = vec![
            app("0b6e1c1a-storefront", "storefront", "shop.example.com", vec!["", "/static"], 4, 5.0, 0.01, 35)?,
            app("2f9d7e55-cart", "cart-service", "shop.example.com", vec!["/cart", "/cart/checkout"], 2, 2.5, 0.03, 60)?,
            app("7a11c0de-payments", "payments", "pay.example.com", vec!["/v1/charges"], 3, 1.0, 0.12, 240)?,
            app("91be4e2f-catalog", "catalog-api", "api.example.com", vec!["/catalog", "/search"], 2, 3.0, 0.02, 45)?,
            app("c3d5a7b9-notify", "notifications", "api.example.com", vec!["/notify"], 1, 0.5, 0.005, 20)?,
        ];
        Ok(Self { apps, iteration: 0 })
    }

    pub fn apps(&self) -> &[DemoApp] {
        &self.apps
    }

    /// Register the simulated apps and their routes
    pub fn register(&self, processor: &EventProcessor) {
        for app in &self.apps {
            processor.register_app(app.app_id.clone(), app.name.clone());
            for route in &app.routes {
                processor.register_route(&app.host, route, Some(app.app_id.clone()));
            }
        }
    }

    fn pick_app(&self, rng: &mut impl Rng) -> &DemoApp {
        let total: f64 = self.apps.iter().map(|a| a.weight).sum();
        let mut target = rng.gen_range(0.0..total);
        for app in &self.apps {
            if target < app.weight {
                return app;
            }
            target -= app.weight;
        }
        &self.apps[self.apps.len() - 1]
    }

    /// Generate the next batch of `count` HTTP events plus the logs and
    /// container metrics that go with them
    pub fn next_batch(&mut self, count: usize) -> Vec<Event> {
        self.iteration += 1;
        let mut rng = thread_rng();
        let variation = (self.iteration as f64 * 0.1).sin() * 0.2;
        let mut events = Vec::with_capacity(count + self.apps.len());

        for _ in 0..count {
            let app = self.pick_app(&mut rng);
            let route = app.routes[rng.gen_range(0..app.routes.len())];
            let status_code = if rng.gen_bool(app.error_rate.clamp(0.0, 1.0)) {
                if rng.gen_bool(0.5) { 500 } else { 503 }
            } else if rng.gen_bool(0.05) {
                404
            } else if rng.gen_bool(0.03) {
                302
            } else {
                200
            };
            let jitter = rng.gen_range(0.5..1.8);
            let latency = (app.base_latency_ms as f64 * (1.0 + variation) * jitter).max(1.0);
            let suffix = ["", "/items", "/42", "/detail/7"][rng.gen_range(0..4)];

            events.push(Event::Http(HttpEvent {
                app_id: app.app_id.clone(),
                instance_index: rng.gen_range(0..app.instances),
                host: app.host.clone(),
                path: format!("{route}{suffix}"),
                method: if rng.gen_bool(0.8) { "GET" } else { "POST" }.to_string(),
                status_code,
                response_time: Duration::from_millis(latency as u64),
                user_agent: rng
                    .gen_bool(0.95)
                    .then(|| USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())].to_string()),
                remote_address: Some(format!("10.0.{}.{}", rng.gen_range(0..8), rng.gen_range(1..255))),
            }));

            if rng.gen_bool(0.3) {
                events.push(Event::Log(LogEvent {
                    app_id: app.app_id.clone(),
                    source_type: "APP/PROC/WEB".to_string(),
                    stream: if status_code >= 500 { LogStream::Err } else { LogStream::Out },
                }));
            }
        }

        for app in &self.apps {
            for instance_index in 0..app.instances {
                events.push(Event::ContainerMetric(ContainerMetricEvent {
                    app_id: app.app_id.clone(),
                    instance_index,
                    cpu_percentage: (app.weight * 4.0 * (1.0 + variation) + rng.gen_range(0.0..3.0)).min(100.0),
                    memory_bytes: 256 * 1024 * 1024 + rng.gen_range(0..64) * 1024 * 1024,
                    disk_bytes: 128 * 1024 * 1024,
                }));
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigBuilder, ManualClock, SharedClock};

    #[test]
    fn test_batch_shape() {
        let mut generator = DemoGenerator::new().unwrap();
        let events = generator.next_batch(50);
        let http = events.iter().filter(|e| matches!(e, Event::Http(_))).count();
        let containers = events.iter().filter(|e| matches!(e, Event::ContainerMetric(_))).count();
        assert_eq!(http, 50);
        let instances: u32 = generator.apps().iter().map(|a| a.instances).sum();
        assert_eq!(containers, instances as usize);
    }

    #[test]
    fn test_generated_paths_attribute_to_routes() {
        let config = ConfigBuilder::new().build().unwrap();
        let clock: SharedClock = ManualClock::new();
        let processor = EventProcessor::new(&config, clock);
        let mut generator = DemoGenerator::new().unwrap();
        generator.register(&processor);
        for event in generator.next_batch(200) {
            processor.process(&event);
        }
        let unmatched: f64 = processor
            .route_rows()
            .iter()
            .filter(|r| r.route == crate::stats::UNMATCHED_ROUTE)
            .map(|r| r.requests)
            .sum();
        assert_eq!(unmatched, 0.0);
        assert_eq!(processor.app_count(), generator.apps().len());
    }
}
