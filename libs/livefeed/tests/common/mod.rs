//! Common test utilities for livefeed integration tests
//!
//! Builders for wire frames so tests read like the feed they simulate.

#![allow(dead_code)]

use std::sync::Arc;

use livefeed::{CaptureSink, FeedConfig, FeedEngine, GoalCapture};
use parking_lot::Mutex;

/// Listing (snapshot-style) fixture id of the test match
pub const FIXTURE: &str = "188665548";
/// Stable event id of the test match
pub const EVENT_ID: &str = "151234567";
pub const EVENT_NAME: &str = "Arsenal (Kray) v Chelsea (Bob)";
pub const LEAGUE: &str = "Esoccer Battle - 8 mins play";

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub fn item_key(fixture: &str) -> String {
    format!("OV{}C1A_1_3", fixture)
}

pub fn selection_key(fixture: &str, selection_id: &str) -> String {
    format!("OV{}-{}_1_3", fixture, selection_id)
}

pub fn snapshot_record(key: &str, body: &str) -> String {
    format!("\x14{}\x01F|{}|\x08", key, body)
}

pub fn insert_record(key: &str, body: &str) -> String {
    format!("\x15{}\x01I|{}|\x08", key, body)
}

pub fn update_record(key: &str, body: &str) -> String {
    format!("\x15{}\x01U|{}|\x08", key, body)
}

pub fn delete_record(key: &str) -> String {
    format!("\x15{}\x01D||\x08", key)
}

/// Join records into one frame
pub fn frame(records: &[String]) -> String {
    records.concat()
}

/// Event segment of a listing snapshot
pub fn event_segment(event_id: &str, fixture: &str, name: &str, league: &str, score: &str) -> String {
    format!(
        "EV;IT={};C2={};FI={};NA={};CT={};SS={};MD=0;TM=3;TS=0;TT=0;",
        item_key(fixture),
        event_id,
        fixture,
        name,
        league,
        score
    )
}

/// Full-resync listing frame with one event
pub fn listing_frame(event_id: &str, fixture: &str, score: &str) -> String {
    snapshot_record(
        "OVInPlay_1_3",
        &format!(
            "CL;NA=Soccer;|{}",
            event_segment(event_id, fixture, EVENT_NAME, LEAGUE, score)
        ),
    )
}

/// Market snapshot of one event: `segments` follow an `EV` segment
pub fn markets_frame(event_id: &str, fixture: &str, segments: &[&str]) -> String {
    let body = format!("EV;C2={};FI={};|{}", event_id, fixture, segments.join("|"));
    snapshot_record(&item_key(fixture), &body)
}

/// A match with a result market, a totals market and a goal-timing market
pub fn seeded_engine(config: &FeedConfig) -> FeedEngine {
    let engine = FeedEngine::new(config);
    engine.ingest_at(&listing_frame(EVENT_ID, FIXTURE, "1-1"), 1_000);
    engine.ingest_at(
        &markets_frame(
            EVENT_ID,
            FIXTURE,
            &[
                "MG;ID=1777;NA=Fulltime Result;OR=0;",
                "PA;ID=900001;NA=Arsenal (Kray);OD=6/4;OR=0;",
                "PA;ID=900002;NA=Draw;OD=12/5;OR=1;",
                "PA;ID=900003;NA=Chelsea (Bob);OD=7/4;OR=2;",
                "MG;ID=10148;NA=Match Goals;OR=1;",
                "PA;ID=900011;OD=5/6;HA=2.5;OR=0;",
                "PA;ID=900012;OD=1/1;HA=2.5;OR=1;",
                "MG;ID=10565;NA=3rd Goal;OR=2;",
                "PA;ID=900021;NA=Arsenal (Kray);OD=4/5;OR=0;",
                "PA;ID=900022;NA=No Goal;OD=9/1;OR=1;",
                "PA;ID=900023;NA=Chelsea (Bob);OD=5/4;OR=2;",
            ],
        ),
        1_001,
    );
    engine
}

/// Capture sink collecting into memory
#[derive(Default)]
pub struct CollectingSink {
    pub captures: Mutex<Vec<GoalCapture>>,
}

impl CaptureSink for CollectingSink {
    fn submit(&self, capture: GoalCapture) {
        self.captures.lock().push(capture);
    }
}

pub fn collecting_sink() -> Arc<CollectingSink> {
    Arc::new(CollectingSink::default())
}
