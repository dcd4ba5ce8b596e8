//! Wire protocol layer
//!
//! Tokenizer, segment decoder and key patterns. Everything in here is pure
//! and stateless.

pub mod keys;
pub mod segment;
pub mod tokenizer;

pub use keys::{fixture_and_selection, item_fixture, scan_frame_fixtures, FrameFixtures, ItemCategory};
pub use segment::{
    contains_entity_segments, decode_segments, non_empty, parse_fields, EventFields, MarketFields,
    RawFields, Segment, SegmentTag, SelectionFields,
};
pub use tokenizer::{strip_control_bytes, tokenize, Action, Record, SNAPSHOT_MARKER};
