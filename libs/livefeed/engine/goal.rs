//! Goal detection, goal-market purge and the forensic capture window

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::domain::Event;
use crate::protocol::{non_empty, EventFields};

static RE_GOAL_MARKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:\d+(?:st|nd|rd|th)\s+goal|next\s+goal|goal)\b").unwrap()
});

/// Markets invalidated by a score change: any name containing the word
/// `Goal` (`3rd Goal`, `Next Goal`, `Goal Line`). `Match Goals` is not one.
pub fn is_goal_market(name: &str) -> bool {
    RE_GOAL_MARKET.is_match(name)
}

/// Why a header delta counts as a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSignal {
    /// `UC=Goal`
    UpdateCause,
    /// `SS` differs from the stored score
    ScoreChange,
}

impl GoalSignal {
    pub fn reason(&self) -> &'static str {
        match self {
            GoalSignal::UpdateCause => "update_cause",
            GoalSignal::ScoreChange => "score_change",
        }
    }
}

/// Compare the stored score with an incoming header patch.
pub fn detect_goal(previous_score: &str, fields: &EventFields) -> Option<GoalSignal> {
    if non_empty(&fields.update_cause).is_some_and(|uc| uc.eq_ignore_ascii_case("goal")) {
        return Some(GoalSignal::UpdateCause);
    }
    let previous = previous_score.trim();
    match non_empty(&fields.score) {
        Some(now) if !previous.is_empty() && now != previous => Some(GoalSignal::ScoreChange),
        _ => None,
    }
}

/// Delete every goal-timing market of the event. Returns the removed keys.
pub fn purge_goal_markets(event: &mut Event) -> Vec<String> {
    let removed: Vec<String> = event
        .markets
        .iter()
        .filter(|(_, market)| is_goal_market(&market.name))
        .map(|(key, _)| key.clone())
        .collect();

    for key in &removed {
        event.markets.shift_remove(key);
    }
    removed
}

// =============================================================================
// Capture window
// =============================================================================

/// A buffered window of raw frames around a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalCapture {
    pub event_id: String,
    pub score_before: String,
    pub score_after: String,
    pub ts: i64,
    /// (arrival ts, raw frame), oldest first
    pub frames: Vec<(i64, String)>,
}

#[derive(Debug, Clone)]
struct PendingGoal {
    /// The goal frame itself is still to be observed
    goal_frame: bool,
    frames_left: usize,
    score_before: String,
    score_after: String,
    ts: i64,
}

/// Per-event rolling buffer of raw frames plus armed goal countdowns
#[derive(Debug)]
pub struct GoalTracker {
    enabled: bool,
    capacity: usize,
    frames_after: usize,
    rings: HashMap<String, VecDeque<(i64, String)>>,
    pending: HashMap<String, PendingGoal>,
}

impl GoalTracker {
    /// `frames_before + frames_after` frames are kept per event so the dump
    /// holds both sides of the goal.
    pub fn new(enabled: bool, frames_before: usize, frames_after: usize) -> Self {
        Self {
            enabled,
            capacity: (frames_before + frames_after).max(1),
            frames_after: frames_after.max(1),
            rings: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Start the countdown for an event. A second goal re-arms it. The frame
    /// carrying the goal is buffered but not counted.
    pub fn arm(&mut self, event_id: &str, score_before: &str, score_after: &str, ts: i64) {
        if !self.enabled {
            return;
        }
        self.pending.insert(
            event_id.to_string(),
            PendingGoal {
                goal_frame: true,
                frames_left: self.frames_after,
                score_before: score_before.to_string(),
                score_after: score_after.to_string(),
                ts,
            },
        );
    }

    /// Record a frame that touched the event and advance its countdown.
    pub fn observe(&mut self, event_id: &str, raw: &str, now: i64) -> Option<GoalCapture> {
        if !self.enabled {
            return None;
        }

        let ring = self.rings.entry(event_id.to_string()).or_default();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back((now, raw.to_string()));

        let pending = self.pending.get_mut(event_id)?;
        if pending.goal_frame {
            pending.goal_frame = false;
            return None;
        }
        pending.frames_left = pending.frames_left.saturating_sub(1);
        if pending.frames_left > 0 {
            return None;
        }

        let pending = self.pending.remove(event_id)?;
        let frames = ring.iter().cloned().collect::<Vec<_>>();
        info!(
            event_id = %event_id,
            before = %pending.score_before,
            after = %pending.score_after,
            frames = frames.len(),
            "Goal capture window complete"
        );
        Some(GoalCapture {
            event_id: event_id.to_string(),
            score_before: pending.score_before,
            score_after: pending.score_after,
            ts: pending.ts,
            frames,
        })
    }

    /// Drop the buffer and any armed countdown of a removed event.
    pub fn forget(&mut self, event_id: &str) {
        self.rings.remove(event_id);
        self.pending.remove(event_id);
    }
}
