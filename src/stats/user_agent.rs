//! Request counts per user agent.

use crate::core::SharedClock;
use crate::metrics::SlidingWindowCounter;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Bucket for agents seen after the tracking bound is reached.
pub const OTHER_USER_AGENTS: &str = "<other>";
/// Bucket for requests without a user agent header.
pub const UNKNOWN_USER_AGENT: &str = "<none>";

/// Bounded set of per-agent request counters.
///
/// At most `max_agents` keys are held, the overflow bucket included.
#[derive(Debug)]
pub struct UserAgentStats {
    window: Duration,
    clock: SharedClock,
    max_agents: usize,
    agents: DashMap<String, Arc<SlidingWindowCounter>>,
}

impl UserAgentStats {
    pub fn new(window: Duration, clock: SharedClock, max_agents: usize) -> Self {
        Self {
            window,
            clock,
            max_agents,
            agents: DashMap::new(),
        }
    }

    /// Count one request from `user_agent`
    pub fn record(&self, user_agent: Option<&str>) {
        let agent = match user_agent {
            Some(ua) if !ua.trim().is_empty() => ua,
            _ => UNKNOWN_USER_AGENT,
        };
        if let Some(counter) = self.agents.get(agent) {
            counter.increment();
            return;
        }
        let key = if self.named_agents() + 1 >= self.max_agents {
            OTHER_USER_AGENTS
        } else {
            agent
        };
        let counter = Arc::clone(
            self.agents
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(SlidingWindowCounter::new(self.window, Arc::clone(&self.clock))))
                .value(),
        );
        counter.increment();
    }

    fn named_agents(&self) -> usize {
        self.agents.len() - usize::from(self.agents.contains_key(OTHER_USER_AGENTS))
    }

    /// (agent, requests in window) for every tracked agent
    pub fn snapshot(&self) -> Vec<(String, usize)> {
        self.agents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().rate()))
            .collect()
    }

    /// Drop agents with no requests left in the window; returns how many were removed
    pub fn prune_idle(&self) -> usize {
        let before = self.agents.len();
        self.agents.retain(|_, counter| counter.rate() > 0);
        before - self.agents.len()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
