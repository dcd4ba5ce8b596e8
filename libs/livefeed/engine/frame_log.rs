//! Per-event explain log
//!
//! A bounded history of what the engine did to each event. Read back through
//! `FeedEngine::query_frame_log` when a price looks wrong.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

/// Counts of one snapshot application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    pub events: u32,
    pub markets: u32,
    pub selections: u32,
    pub ignored: u32,
    pub upserts: u32,
}

/// What happened to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogSummary {
    DeltaApplied {
        fixture: String,
        selection: String,
        provisional: bool,
    },
    HeaderPatched {
        item: String,
        score: String,
    },
    SnapshotApplied {
        fixture: Option<String>,
        market_key: Option<String>,
        stats: SegmentStats,
    },
    GoalPurge {
        reason: String,
        removed: Vec<String>,
    },
    StaleRemoved {
        removed: Vec<String>,
        timeout_secs: i64,
    },
    CaptureEmitted {
        frames: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub ts: i64,
    pub summary: LogSummary,
}

/// Bounded log per stable event id
#[derive(Debug)]
pub struct FrameLog {
    capacity: usize,
    entries: HashMap<String, VecDeque<LogEntry>>,
}

impl FrameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    pub fn push(&mut self, event_id: &str, ts: i64, summary: LogSummary) {
        let log = self.entries.entry(event_id.to_string()).or_default();
        if log.len() == self.capacity {
            log.pop_front();
        }
        log.push_back(LogEntry { ts, summary });
    }

    /// Entries for an event, oldest first
    pub fn entries(&self, event_id: &str) -> Vec<LogEntry> {
        self.entries
            .get(event_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn forget(&mut self, event_id: &str) {
        self.entries.remove(event_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = FrameLog::new(2);
        for ts in 0..5 {
            log.push("E", ts, LogSummary::CaptureEmitted { frames: ts as usize });
        }

        let entries = log.entries("E");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ts, 3);
        assert_eq!(entries[1].ts, 4);
        assert!(log.entries("other").is_empty());
    }

    #[test]
    fn test_forget_clears_one_event() {
        let mut log = FrameLog::new(4);
        log.push("E1", 1, LogSummary::CaptureEmitted { frames: 1 });
        log.push("E2", 2, LogSummary::CaptureEmitted { frames: 2 });

        log.forget("E1");
        assert!(log.entries("E1").is_empty());
        assert_eq!(log.entries("E2").len(), 1);
    }

    #[test]
    fn test_summary_serializes_with_type_tag() {
        let entry = LogEntry {
            ts: 1,
            summary: LogSummary::GoalPurge {
                reason: "score_change".to_string(),
                removed: vec!["3rd Goal".to_string()],
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["summary"]["type"], "goal_purge");
        assert_eq!(json["summary"]["removed"][0], "3rd Goal");
    }
}
