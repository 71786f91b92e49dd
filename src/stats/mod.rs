//! Live statistics built from the event stream.

pub mod app;
pub mod http;
pub mod processor;
pub mod route;
pub mod rows;
pub mod user_agent;

pub use app::{AppSnapshot, AppStats};
pub use http::{HttpSnapshot, HttpStats};
pub use processor::{EventProcessor, PruneReport};
pub use route::{HostStats, RouteSnapshot, RouteStats, UNMATCHED_ROUTE};
pub use rows::{AppRow, HostRow, RouteRow, UserAgentRow};
pub use user_agent::{UserAgentStats, OTHER_USER_AGENTS, UNKNOWN_USER_AGENT};
