use crate::core::error::{FiretopError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Application identifier (platform GUID)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppId(String);

impl AppId {
    /// Creates a new AppId after validation
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(FiretopError::invalid_event("AppId cannot be empty"));
        }
        if id.len() > 255 {
            return Err(FiretopError::invalid_event("AppId cannot exceed 255 characters"));
        }
        Ok(AppId(id))
    }

    /// Returns the string representation of the app id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output stream of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStream {
    Out,
    Err,
}

/// Decoded HTTP start/stop event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpEvent {
    pub app_id: AppId,
    pub instance_index: u32,
    pub host: String,
    pub path: String,
    pub method: String,
    pub status_code: u16,
    #[serde(with = "humantime_serde")]
    pub response_time: Duration,
    pub user_agent: Option<String>,
    pub remote_address: Option<String>,
}

impl HttpEvent {
    /// Status class (2, 3, 4, 5) or `None` for anything outside 200..600
    pub fn status_class(&self) -> Option<u16> {
        match self.status_code {
            200..=599 => Some(self.status_code / 100),
            _ => None,
        }
    }
}

/// Decoded log line event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub app_id: AppId,
    pub source_type: String,
    pub stream: LogStream,
}

/// Decoded container metric event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetricEvent {
    pub app_id: AppId,
    pub instance_index: u32,
    pub cpu_percentage: f64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
}

/// Any decoded firehose event the core consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Http(HttpEvent),
    Log(LogEvent),
    ContainerMetric(ContainerMetricEvent),
}

impl Event {
    /// Application this event belongs to
    pub fn app_id(&self) -> &AppId {
        match self {
            Event::Http(e) => &e.app_id,
            Event::Log(e) => &e.app_id,
            Event::ContainerMetric(e) => &e.app_id,
        }
    }

    /// Short kind name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Http(_) => "http",
            Event::Log(_) => "log",
            Event::ContainerMetric(_) => "container_metric",
        }
    }
}
