//! Live Odds Feed - Main Library
//!
//! Thin presentation crate over the `livefeed` state engine.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **livefeed**: Feed state engine (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,no_run
//! use live_odds_feed::bin_common::{load_config_from_env, ConfigType};
//! use live_odds_feed::livefeed::{FeedConfig, FeedEngine};
//!
//! let config = FeedConfig::load_or_default(load_config_from_env(ConfigType::Feed)).unwrap();
//! let engine = FeedEngine::new(&config);
//! ```

// Re-export workspace libraries for convenience
pub use livefeed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType, ReplayArgs};
    pub use runner::{pace, BinaryRunner, RunConfig};
}
