//! Infrastructure Layer
//!
//! Configuration, logging and the best-effort file I/O around the engine.

pub mod capture_writer;
pub mod config;
pub mod dump;
pub mod logging;

pub use capture_writer::{dump_file_name, render_dump, CaptureSink, GoalDumpWriter};
pub use config::{
    CaptureConfig, ConfigError, DebugConfig, FeedConfig, StaleConfig, TargetsConfig,
};
pub use dump::{parse_dump_blocks, DumpFrame};
pub use logging::init_tracing;
