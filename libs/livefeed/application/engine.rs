//! Feed engine facade
//!
//! Public API for the outer layers (HTTP, browser orchestration, binaries).
//! Ingestion holds the write lock for one whole frame; views are built under
//! the read lock so they always see a frame boundary.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{FeedState, IngestStats, LogEntry, RawPreview};
use crate::infrastructure::{parse_dump_blocks, CaptureSink, FeedConfig};
use crate::protocol::ItemCategory;
use crate::view::{build_event_view, EventView};

use super::targets::TargetScheduler;

/// Current unix time in seconds
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Result of [`FeedEngine::query_snapshot`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotQuery {
    /// One event, `None` when unknown
    Event(Option<EventView>),
    /// Every active event keyed by stable id
    All(IndexMap<String, EventView>),
}

pub struct FeedEngine {
    state: RwLock<FeedState>,
    targets: Mutex<TargetScheduler>,
    league_filter: Option<String>,
    sink: Option<Arc<dyn CaptureSink>>,
}

impl FeedEngine {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            state: RwLock::new(FeedState::new(&config.engine_settings())),
            targets: Mutex::new(TargetScheduler::new(&config.targets)),
            league_filter: config
                .league_filter
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            sink: None,
        }
    }

    /// Hand completed goal captures to `sink`
    pub fn with_capture_sink(mut self, sink: Arc<dyn CaptureSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Ingest one raw frame. Never fails; problems are counted in [`IngestStats`].
    pub fn ingest(&self, raw: &str) {
        self.ingest_at(raw, now_ts());
    }

    /// [`FeedEngine::ingest`] with an explicit clock. Returns the stable ids of
    /// the events the frame touched.
    pub fn ingest_at(&self, raw: &str, now: i64) -> BTreeSet<String> {
        if raw.is_empty() {
            return BTreeSet::new();
        }

        let outcome = {
            let mut state = self.state.write();
            state.ingest_frame(raw, now)
        };

        if let Some(sink) = &self.sink {
            for capture in outcome.captures {
                sink.submit(capture);
            }
        }

        outcome.touched
    }

    /// Ingest every frame of a dump text. Frames use their block timestamp
    /// when present, else `now`. Returns the number of frames ingested.
    pub fn replay_dump(&self, text: &str, now: i64) -> usize {
        let frames = parse_dump_blocks(text);
        for frame in &frames {
            self.ingest_at(&frame.raw, frame.ts.unwrap_or(now));
        }
        info!(frames = frames.len(), "Dump replayed");
        frames.len()
    }

    /// Run the staleness reaper over every event
    pub fn sweep_stale(&self) -> usize {
        self.sweep_stale_at(now_ts())
    }

    pub fn sweep_stale_at(&self, now: i64) -> usize {
        let removed = self.state.write().sweep_stale(now);
        if removed > 0 {
            debug!(removed, "Stale sweep");
        }
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn active_ids(&self, state: &FeedState) -> Vec<String> {
        let mut seen = HashSet::new();
        state
            .store()
            .listing()
            .filter(|(_, entry)| entry.category == ItemCategory::Soccer)
            .filter_map(|(_, entry)| state.store().event(&entry.event_id))
            .filter(|event| match &self.league_filter {
                Some(filter) => event.league.contains(filter.as_str()),
                None => true,
            })
            .filter(|event| seen.insert(event.id.clone()))
            .map(|event| event.id.clone())
            .collect()
    }

    /// Stable ids of the listed soccer events passing the league filter
    pub fn query_active_ids(&self) -> Vec<String> {
        let state = self.state.read();
        self.active_ids(&state)
    }

    pub fn query_snapshot(&self, event_id: Option<&str>) -> SnapshotQuery {
        self.query_snapshot_at(event_id, now_ts())
    }

    pub fn query_snapshot_at(&self, event_id: Option<&str>, now: i64) -> SnapshotQuery {
        match event_id {
            Some(id) => SnapshotQuery::Event(self.query_event_at(id, now)),
            None => {
                let state = self.state.read();
                let targets = self.targets.lock();
                let all = self
                    .active_ids(&state)
                    .into_iter()
                    .filter_map(|id| {
                        let event = state.store().event(&id)?;
                        let view = build_event_view(event, Some(targets.match_url(&id)), now);
                        Some((id, view))
                    })
                    .collect();
                SnapshotQuery::All(all)
            }
        }
    }

    pub fn query_event(&self, event_id: &str) -> Option<EventView> {
        self.query_event_at(event_id, now_ts())
    }

    pub fn query_event_at(&self, event_id: &str, now: i64) -> Option<EventView> {
        let state = self.state.read();
        let event = state.store().event(event_id.trim())?;
        let url = self.targets.lock().match_url(&event.id);
        Some(build_event_view(event, Some(url), now))
    }

    /// Explain log of one event, oldest first
    pub fn query_frame_log(&self, event_id: &str) -> Vec<LogEntry> {
        self.state.read().frame_log(event_id.trim())
    }

    pub fn query_recent_raw(&self) -> Vec<RawPreview> {
        self.state.read().recent_raw()
    }

    pub fn stats(&self) -> IngestStats {
        self.state.read().stats().clone()
    }

    // =========================================================================
    // Targets
    // =========================================================================

    pub fn match_url(&self, event_id: &str) -> String {
        self.targets.lock().match_url(event_id)
    }

    pub fn should_visit(&self, event_id: &str, now: i64) -> bool {
        self.targets.lock().should_visit(event_id, now)
    }

    /// URLs of active events due for a visit, recorded as sent
    pub fn next_targets(&self, limit: Option<usize>) -> Vec<String> {
        self.next_targets_at(limit, now_ts())
    }

    pub fn next_targets_at(&self, limit: Option<usize>, now: i64) -> Vec<String> {
        let active = self.query_active_ids();
        self.targets.lock().next_targets(&active, limit, now)
    }

    pub fn set_target_cooldown(&self, secs: i64) {
        self.targets.lock().set_cooldown(secs);
    }
}

impl Default for FeedEngine {
    fn default() -> Self {
        Self::new(&FeedConfig::default())
    }
}
