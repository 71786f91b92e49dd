//! firetop - live "top" for a platform event firehose.
//!
//! firetop turns a stream of decoded runtime events (HTTP transactions, log
//! lines, container metrics) into constantly refreshing, sortable and
//! filterable tables of per-application, per-route, per-host and
//! per-user-agent statistics.
//!
//! # Architecture
//!
//! - `metrics`: sliding-window counters and averages
//! - `routes`: longest-prefix route attribution
//! - `table`: multi-key sorting, column filters and the edit transaction
//! - `stats`: stat entities and the event processor
//! - `dashboard`: one table per view
//! - `core`: errors, configuration, clock and event records
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use firetop_lib::core::ConfigBuilder;
//! use firetop_lib::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new().demo(true).build()?;
//!     let app = Application::new(config)?;
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod application;
pub mod cli;
pub mod core;
pub mod dashboard;
pub mod demo;
pub mod metrics;
pub mod routes;
pub mod stats;
pub mod table;

pub use crate::application::Application;
pub use crate::core::{Config, Result};
