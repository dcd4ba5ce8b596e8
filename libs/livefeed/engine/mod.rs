//! Engine Layer
//!
//! Stateful side of the feed: correlation tables, the entity store and the
//! patch logic that mutates it, goal handling and housekeeping.

pub mod correlator;
pub mod frame_log;
pub mod goal;
pub mod patch;
pub mod reaper;
mod snapshot;
pub mod state;
pub mod stats;
pub mod store;

pub use correlator::{Correlator, MarketPointer};
pub use frame_log::{FrameLog, LogEntry, LogSummary, SegmentStats};
pub use goal::{detect_goal, is_goal_market, purge_goal_markets, GoalCapture, GoalSignal, GoalTracker};
pub use patch::{apply_selection_patch, insert_provisional, SelectionPatch};
pub use reaper::StaleReaper;
pub use state::{EngineSettings, FeedState, FrameOutcome, RawPreview};
pub use stats::IngestStats;
pub use store::{ensure_market, normalize_market_name, EntityStore, ListingEntry, UNKNOWN_MARKET};
