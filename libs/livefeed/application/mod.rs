//! Application Layer
//!
//! The `FeedEngine` facade and the target scheduler used by the outer layers.

pub mod engine;
pub mod targets;

pub use engine::{now_ts, FeedEngine, SnapshotQuery};
pub use targets::TargetScheduler;
