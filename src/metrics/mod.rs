//! Fixed-window metric trackers.
//!
//! Both trackers turn an unbounded event stream into bounded statistics:
//! - `SlidingWindowCounter`: events per trailing window
//! - `SlidingWindowAverage`: samples per trailing window and their mean
//!
//! Every operation evicts stale entries first, so the cost is amortized O(1).

pub mod average;
pub mod window;

pub use average::{SlidingWindowAverage, NO_DATA};
pub use window::SlidingWindowCounter;
