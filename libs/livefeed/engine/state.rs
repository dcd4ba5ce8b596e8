//! Feed state
//!
//! Everything one ingestion path mutates: the entity store, the correlation
//! tables, the goal tracker and the bookkeeping around them. A `FeedState`
//! processes frames strictly one at a time; the application layer wraps it in
//! a lock.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::FeedError;
use crate::protocol::{
    fixture_and_selection, parse_fields, tokenize, Action, EventFields, Record,
};

use super::correlator::Correlator;
use super::frame_log::{FrameLog, LogEntry, LogSummary};
use super::goal::{detect_goal, purge_goal_markets, GoalCapture, GoalSignal, GoalTracker};
use super::patch::{apply_selection_patch, insert_provisional, SelectionPatch};
use super::reaper::StaleReaper;
use super::stats::IngestStats;
use super::store::{merge_event_fields, EntityStore};

/// Tunables of the ingestion path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub frame_log_capacity: usize,
    pub capture_enabled: bool,
    pub frames_before: usize,
    pub frames_after: usize,
    pub stale_enabled: bool,
    pub stale_timeout_secs: i64,
    pub preview_max: usize,
    pub preview_chars: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            frame_log_capacity: 50,
            capture_enabled: true,
            frames_before: 40,
            frames_after: 40,
            stale_enabled: false,
            stale_timeout_secs: 120,
            preview_max: 20,
            preview_chars: 4000,
        }
    }
}

/// Head of a recently received frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPreview {
    pub ts: i64,
    pub len: usize,
    pub preview: String,
}

/// What one frame changed
#[derive(Debug, Default)]
pub struct FrameOutcome {
    /// Stable ids of every event the frame touched
    pub touched: BTreeSet<String>,
    /// Goal windows completed by this frame
    pub captures: Vec<GoalCapture>,
}

#[derive(Debug)]
pub struct FeedState {
    pub(crate) store: EntityStore,
    pub(crate) correlator: Correlator,
    pub(crate) goals: GoalTracker,
    pub(crate) reaper: StaleReaper,
    pub(crate) frame_log: FrameLog,
    pub(crate) stats: IngestStats,
    recent_raw: VecDeque<RawPreview>,
    preview_max: usize,
    preview_chars: usize,
}

impl FeedState {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            store: EntityStore::new(),
            correlator: Correlator::new(),
            goals: GoalTracker::new(
                settings.capture_enabled,
                settings.frames_before,
                settings.frames_after,
            ),
            reaper: StaleReaper::new(settings.stale_enabled, settings.stale_timeout_secs),
            frame_log: FrameLog::new(settings.frame_log_capacity),
            stats: IngestStats::default(),
            recent_raw: VecDeque::new(),
            preview_max: settings.preview_max,
            preview_chars: settings.preview_chars,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn frame_log(&self, event_id: &str) -> Vec<LogEntry> {
        self.frame_log.entries(event_id)
    }

    /// Recent frame heads, oldest first
    pub fn recent_raw(&self) -> Vec<RawPreview> {
        self.recent_raw.iter().cloned().collect()
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Process one raw frame to completion. Nothing in here fails: malformed
    /// or unresolvable records are counted and dropped.
    pub fn ingest_frame(&mut self, raw: &str, now: i64) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        self.stats.frames += 1;
        self.remember_raw(raw, now);

        self.correlator.learn_frame(raw);

        let (records, errors) = tokenize(raw);
        self.stats.malformed += errors.len() as u64;
        self.stats.records += records.len() as u64;

        for record in &records {
            self.apply_record(record, now, &mut outcome.touched);
        }

        for event_id in &outcome.touched {
            if let Some(capture) = self.goals.observe(event_id, raw, now) {
                self.frame_log.push(
                    event_id,
                    now,
                    LogSummary::CaptureEmitted {
                        frames: capture.frames.len(),
                    },
                );
                self.stats.captures += 1;
                outcome.captures.push(capture);
            }
        }

        outcome
    }

    fn remember_raw(&mut self, raw: &str, now: i64) {
        if self.preview_max == 0 {
            return;
        }
        if self.recent_raw.len() == self.preview_max {
            self.recent_raw.pop_front();
        }
        self.recent_raw.push_back(RawPreview {
            ts: now,
            len: raw.len(),
            preview: raw.chars().take(self.preview_chars).collect(),
        });
    }

    fn apply_record(&mut self, record: &Record, now: i64, touched: &mut BTreeSet<String>) {
        match record.action {
            Action::Snapshot => {
                if record.full_resync {
                    self.stats.full_resyncs += 1;
                    self.store.reset_listing();
                    info!(
                        events = self.store.event_count(),
                        fixtures = self.correlator.fixture_count(),
                        "Full resync"
                    );
                }
                self.apply_snapshot(&record.body, now, touched);
            }
            // An insert outside a snapshot is treated as a one-off partial
            // snapshot with a fresh context.
            Action::Insert => self.apply_snapshot(&record.body, now, touched),
            Action::Update => self.apply_update(record, now, touched),
            Action::Delete => {
                if let Some(event_id) = self.store.delete_item(record.item_key()) {
                    self.stats.deletes += 1;
                    self.goals.forget(&event_id);
                    self.frame_log.forget(&event_id);
                    touched.remove(&event_id);
                    debug!(event_id = %event_id, item = %record.item_key(), "Event deleted");
                }
            }
        }
    }

    fn apply_update(&mut self, record: &Record, now: i64, touched: &mut BTreeSet<String>) {
        let fields = parse_fields(&record.body);
        if fields.is_empty() {
            return;
        }

        let mut routed = false;

        if let Some(entry) = self.store.listed(record.item_key()).cloned() {
            routed = true;
            let header = EventFields::from_fields(&fields);
            self.apply_header_patch(&entry.event_id, record.item_key(), &header, now, touched);
        }

        if let Some((fixture, selection)) = fixture_and_selection(&record.target_key) {
            routed = true;
            let patch = SelectionPatch::from_fields(&record.target_key, &fields);
            self.apply_selection_delta(&fixture, &selection, &patch, now, touched);
        }

        if !routed {
            self.stats.unrouted += 1;
            trace!(key = %record.target_key, "Update matched no listed item or selection");
        }
    }

    fn apply_header_patch(
        &mut self,
        event_id: &str,
        item: &str,
        fields: &EventFields,
        now: i64,
        touched: &mut BTreeSet<String>,
    ) {
        let Some(event) = self.store.event_mut(event_id) else {
            return;
        };

        let previous = event.score.clone();
        let signal = detect_goal(&previous, fields);
        merge_event_fields(event, fields);
        let score = event.score.clone();

        self.stats.header_patches += 1;
        self.frame_log.push(
            event_id,
            now,
            LogSummary::HeaderPatched {
                item: item.to_string(),
                score: score.clone(),
            },
        );
        touched.insert(event_id.to_string());

        if let Some(signal) = signal {
            self.on_goal(event_id, &previous, &score, signal, now);
        }
    }

    pub(super) fn on_goal(&mut self, event_id: &str, before: &str, after: &str, signal: GoalSignal, now: i64) {
        let removed = self
            .store
            .event_mut(event_id)
            .map(purge_goal_markets)
            .unwrap_or_default();

        self.stats.goals += 1;
        info!(
            event_id = %event_id,
            before = %before,
            after = %after,
            reason = signal.reason(),
            removed = removed.len(),
            "Goal detected"
        );

        if !removed.is_empty() {
            self.frame_log.push(
                event_id,
                now,
                LogSummary::GoalPurge {
                    reason: signal.reason().to_string(),
                    removed,
                },
            );
        }
        self.goals.arm(event_id, before, after, now);
    }

    fn apply_selection_delta(
        &mut self,
        fixture: &str,
        selection_id: &str,
        patch: &SelectionPatch,
        now: i64,
        touched: &mut BTreeSet<String>,
    ) {
        let Some(event_id) = self.correlator.resolve_with_selection(fixture, selection_id) else {
            self.stats.unresolvable += 1;
            let error = FeedError::UnresolvableCorrelation {
                fixture: fixture.to_string(),
                selection: selection_id.to_string(),
            };
            debug!(error = %error, "Dropping selection delta");
            return;
        };

        self.correlator.bind_fixture(fixture, &event_id);

        let event = self.store.ensure_event(&event_id);
        if event.name.is_empty() {
            if let Some(name) = self.correlator.event_name(fixture) {
                event.name = name.to_string();
            }
        }
        let mut provisional = false;
        if !apply_selection_patch(event, selection_id, patch, now) {
            let pointer = self.correlator.current_market(fixture);
            let key = insert_provisional(event, fixture, pointer, selection_id, patch, now);
            provisional = true;
            self.stats.provisional += 1;
            debug!(
                event_id = %event_id,
                fixture = %fixture,
                selection = %selection_id,
                market = %key,
                "Provisional selection created"
            );
        }

        self.stats.deltas_applied += 1;
        self.frame_log.push(
            &event_id,
            now,
            LogSummary::DeltaApplied {
                fixture: fixture.to_string(),
                selection: selection_id.to_string(),
                provisional,
            },
        );
        touched.insert(event_id);
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Run the staleness reaper over every event. Returns the number of
    /// markets removed.
    pub fn sweep_stale(&mut self, now: i64) -> usize {
        if !self.reaper.is_enabled() {
            return 0;
        }

        let mut total = 0;
        for event_id in self.store.event_ids() {
            let removed = self.reaper.sweep(&mut self.store, &event_id, now);
            if removed.is_empty() {
                continue;
            }
            total += removed.len();
            self.frame_log.push(
                &event_id,
                now,
                LogSummary::StaleRemoved {
                    removed,
                    timeout_secs: self.reaper.timeout_secs(),
                },
            );
        }

        self.stats.stale_markets_removed += total as u64;
        total
    }
}
