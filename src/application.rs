//! Main application wiring for firetop.

use crate::core::{Config, Event, FiretopError, Result, SharedClock, SystemClock};
use crate::dashboard::Dashboard;
use crate::demo::DemoGenerator;
use crate::stats::EventProcessor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the ingestion channel between transports and the processor
const EVENT_CHANNEL_CAPACITY: usize = 10_000;
/// HTTP events generated per demo tick
const DEMO_BATCH: usize = 40;
const DEMO_TICK: Duration = Duration::from_millis(250);
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(1);

/// Coordinates ingestion, pruning and the periodic dashboard refresh.
pub struct Application {
    config: Config,
    processor: Arc<EventProcessor>,
    dashboard: Dashboard,
    events_tx: mpsc::Sender<Event>,
    events_rx: Option<mpsc::Receiver<Event>>,
}

impl Application {
    /// Create a new Application with the system clock
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Create a new Application with an explicit time source
    pub fn with_clock(config: Config, clock: SharedClock) -> Result<Self> {
        config.validate()?;
        let processor = Arc::new(EventProcessor::new(&config, clock));
        let dashboard = Dashboard::new(config.ui.default_view);
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            processor,
            dashboard,
            events_tx,
            events_rx: Some(events_rx),
        })
    }

    /// Sender a transport uses to feed decoded events in
    pub fn event_sender(&self) -> mpsc::Sender<Event> {
        self.events_tx.clone()
    }

    /// Queue one event for ingestion
    pub async fn submit(&self, event: Event) -> Result<()> {
        self.events_tx.send(event).await.map_err(|_| FiretopError::ChannelSend)
    }

    pub fn processor(&self) -> &Arc<EventProcessor> {
        &self.processor
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    fn spawn_ingest(&mut self) -> Result<JoinHandle<u64>> {
        let mut rx = self
            .events_rx
            .take()
            .ok_or(FiretopError::ChannelReceive)?;
        let processor = Arc::clone(&self.processor);
        Ok(tokio::spawn(async move {
            let mut count = 0u64;
            while let Some(event) = rx.recv().await {
                processor.process(&event);
                count += 1;
            }
            tracing::debug!(count, "event channel closed");
            count
        }))
    }

    fn spawn_demo(&self) -> Result<JoinHandle<()>> {
        let mut generator = DemoGenerator::new()?;
        generator.register(&self.processor);
        let tx = self.event_sender();
        Ok(tokio::spawn(async move {
            let mut tick = tokio::time::interval(DEMO_TICK);
            loop {
                tick.tick().await;
                for event in generator.next_batch(DEMO_BATCH) {
                    if tx.send(event).await.is_err() {
                        tracing::debug!("demo generator stopping");
                        return;
                    }
                }
            }
        }))
    }

    /// Refresh every view and log the active one
    pub fn tick(&mut self) {
        let pruned = self.processor.prune_stale();
        let summary = self.dashboard.refresh(&self.processor);
        tracing::info!(
            view = ?self.dashboard.view(),
            rows = summary.displayed,
            total = summary.total,
            processed = self.processor.processed(),
            pruned_apps = pruned.apps,
            "refresh"
        );
        if self.config.ui.headless_rows == 0 {
            return;
        }
        let table = self.dashboard.render_text(self.config.ui.headless_rows);
        if self.config.headless {
            tracing::info!("\n{table}");
        } else {
            println!("{table}");
        }
    }

    /// Run until ctrl-c
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            window = ?self.config.window.rate_window,
            refresh = ?self.config.ui.refresh_rate,
            demo = self.config.demo,
            "starting firetop"
        );

        let ingest = self.spawn_ingest()?;
        let demo = if self.config.demo {
            Some(self.spawn_demo()?)
        } else {
            None
        };

        let mut refresh = tokio::time::interval(self.config.ui.refresh_rate);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = refresh.tick() => self.tick(),
                result = &mut shutdown => {
                    result?;
                    tracing::info!("received shutdown signal, stopping");
                    break;
                }
            }
        }

        if let Some(demo) = demo {
            demo.abort();
        }
        drop(self.events_tx);
        // outside transports may still hold senders; drain briefly then give up
        match tokio::time::timeout(SHUTDOWN_DRAIN, ingest).await {
            Ok(joined) => {
                let drained = joined?;
                tracing::info!(processed = drained, "firetop stopped");
            },
            Err(_) => {
                tracing::warn!(
                    processed = self.processor.processed(),
                    "event senders still open at shutdown"
                );
            },
        }
        Ok(())
    }
}
