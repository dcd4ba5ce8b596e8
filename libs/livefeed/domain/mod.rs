//! Domain Layer
//!
//! Entities and pure value logic. No dependency on the engine or on I/O.

pub mod models;
pub mod odds;

pub use models::{clean_line, clean_str, is_line_label, Event, Market, MatchClock, Selection};
