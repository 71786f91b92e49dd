//! Core domain models for firetop.
//!
//! This module contains the error type, configuration, time source and the
//! decoded event records the analytics engine consumes.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{Config, ConfigBuilder, ViewMode};
pub use error::{FiretopError, Result};
pub use types::{AppId, ContainerMetricEvent, Event, HttpEvent, LogEvent, LogStream};
