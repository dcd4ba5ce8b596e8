//! # Livefeed
//!
//! State engine for a live in-play odds feed. Raw websocket frames go in; an
//! always-current, queryable view of events, markets and selections comes out.
//!
//! ## Layers
//!
//! - **protocol**: frame tokenizer, segment decoder, key patterns (pure)
//! - **domain**: Event -> Market -> Selection entities and odds conversion
//! - **engine**: identifier correlation, snapshot/delta patching, goal purge
//!   and capture, staleness reaper, per-event explain log
//! - **view**: aggregated read view, display names, next goal lookup, clock
//! - **application**: the thread-safe [`FeedEngine`] facade and match targets
//! - **infrastructure**: config, logging, goal dump writer, dump reader
//!
//! ## Suspension
//!
//! A selection's `suspended` flag only ever changes when the feed sends `SU`.
//! Market suspension is derived from the selections on every read.

pub mod application;
pub mod domain;
pub mod engine;
pub mod error;
pub mod infrastructure;
pub mod protocol;
pub mod view;

pub use application::{now_ts, FeedEngine, SnapshotQuery, TargetScheduler};
pub use domain::{Event, Market, MatchClock, Selection};
pub use engine::{EngineSettings, FeedState, GoalCapture, IngestStats, LogEntry, LogSummary, RawPreview};
pub use error::{FeedError, Result};
pub use infrastructure::{init_tracing, CaptureSink, ConfigError, FeedConfig, GoalDumpWriter};
pub use view::{EventView, MarketView, NextGoalReason, NextGoalView, Period, SelectionView};
