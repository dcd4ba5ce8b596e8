//! Frame tokenizer
//!
//! Splits one transport payload into [`Record`]s. The layout of a frame is
//! `<CTRL><target key>\x01<action letter>|<payload>` repeated and joined by
//! the record separator `|\x08`.

use crate::error::{FeedError, Result};
use tracing::debug;

/// Separator between records inside a frame
pub const RECORD_SEPARATOR: &str = "|\x08";

/// Separator between the target key and the action body
pub const KEY_SEPARATOR: char = '\x01';

/// Control byte leading an initial (snapshot) record
pub const CTRL_INITIAL: char = '\x14';

/// Control byte leading a delta record
pub const CTRL_DELTA: char = '\x15';

/// Control byte that follows the `|` of the record separator
pub const CTRL_BACKSPACE: char = '\x08';

/// Target key prefix of the in-play listing snapshot. Only an initial
/// (`\x14`) record under this prefix is a full resync; deltas addressed by
/// an `OVInPlay_.../<item>` path keep their action letter.
pub const SNAPSHOT_MARKER: &str = "OVInPlay_";

/// Action carried by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Insert,
    Update,
    Delete,
    Snapshot,
}

impl Action {
    /// Parse the action letter of a record (`I`, `U`, `D`, `F`)
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim() {
            "I" => Some(Action::Insert),
            "U" => Some(Action::Update),
            "D" => Some(Action::Delete),
            "F" => Some(Action::Snapshot),
            _ => None,
        }
    }
}

/// One unit of work inside a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub target_key: String,
    pub action: Action,
    pub body: String,
    /// Target key carries the snapshot marker: the listing must be rebuilt
    pub full_resync: bool,
}

impl Record {
    /// Last `/`-separated component of the target key (used by deletes)
    pub fn item_key(&self) -> &str {
        self.target_key.rsplit('/').next().unwrap_or(&self.target_key)
    }
}

/// Remove every wire control byte from a frame.
pub fn strip_control_bytes(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(*c, CTRL_INITIAL | CTRL_DELTA | KEY_SEPARATOR | CTRL_BACKSPACE))
        .collect()
}

/// Parse a single item (already split on the record separator).
pub fn parse_record(item: &str) -> Result<Record> {
    let item = item.trim();
    let lead = item.chars().next();
    let rest = match lead {
        Some(c) if c.is_control() => &item[c.len_utf8()..],
        Some(_) => item,
        None => return Err(FeedError::MalformedRecord("empty item".to_string())),
    };

    let (target_key, action_body) = rest
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| FeedError::MalformedRecord(preview(rest)))?;

    let (letter, payload) = action_body
        .split_once('|')
        .ok_or_else(|| FeedError::MalformedRecord(preview(rest)))?;

    let full_resync = lead == Some(CTRL_INITIAL) && target_key.starts_with(SNAPSHOT_MARKER);
    let action = if full_resync {
        Action::Snapshot
    } else {
        Action::from_letter(letter)
            .ok_or_else(|| FeedError::MalformedRecord(format!("unknown action {:?}", letter)))?
    };

    Ok(Record {
        target_key: target_key.to_string(),
        action,
        body: payload.to_string(),
        full_resync,
    })
}

/// Split a raw frame into records.
///
/// Malformed items are returned separately so the caller can count them.
pub fn tokenize(raw: &str) -> (Vec<Record>, Vec<FeedError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for item in raw.split(RECORD_SEPARATOR) {
        if item.trim().is_empty() {
            continue;
        }
        match parse_record(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(error = %e, "Dropping malformed record");
                errors.push(e);
            }
        }
    }

    (records, errors)
}

fn preview(s: &str) -> String {
    s.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_delta_and_snapshot() {
        let raw = "\x14OVInPlay_1_3\x01F|CL;|EV;C2=100;|\x08\x15OV188665548-469947664_1_3\x01U|OD=5/2;|\x08";
        let (records, errors) = tokenize(raw);

        assert!(errors.is_empty());
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].target_key, "OVInPlay_1_3");
        assert_eq!(records[0].action, Action::Snapshot);
        assert!(records[0].full_resync);
        assert_eq!(records[0].body, "CL;|EV;C2=100;");

        assert_eq!(records[1].target_key, "OV188665548-469947664_1_3");
        assert_eq!(records[1].action, Action::Update);
        assert!(!records[1].full_resync);
        assert_eq!(records[1].body, "OD=5/2;");
    }

    #[test]
    fn test_snapshot_marker_overrides_action_letter() {
        let record = parse_record("\x14OVInPlay_1_3\x01U|EV;NA=x;").unwrap();
        assert_eq!(record.action, Action::Snapshot);
        assert!(record.full_resync);
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let raw = "\x15no-separator-here|\x08\x15KEY\x01no-pipe|\x08\x15KEY\x01D|";
        let (records, errors) = tokenize(raw);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Delete);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], FeedError::MalformedRecord(_)));
    }

    #[test]
    fn test_unknown_action_letter_is_malformed() {
        assert!(parse_record("\x15KEY\x01Z|body").is_err());
    }

    #[test]
    fn test_delta_under_listing_path_keeps_its_letter() {
        let record = parse_record("\x15OVInPlay_1_3/OV1_1_3/OV188665548C1A_1_3\x01D|").unwrap();
        assert_eq!(record.action, Action::Delete);
        assert!(!record.full_resync);
        assert_eq!(record.item_key(), "OV188665548C1A_1_3");

        let record = parse_record("\x15OVInPlay_1_3/OV1_1_3\x01I|EV;C2=100;").unwrap();
        assert_eq!(record.action, Action::Insert);
        assert!(!record.full_resync);
    }

    #[test]
    fn test_initial_record_needs_marker_for_resync() {
        let record = parse_record("\x14OV188665548C1A_1_3\x01F|EV;C2=100;").unwrap();
        assert_eq!(record.action, Action::Snapshot);
        assert!(!record.full_resync);

        let record = parse_record("\x14OVInPlayX\x01F|CL;").unwrap();
        assert!(!record.full_resync);
    }

    #[test]
    fn test_item_key_takes_last_path_component() {
        let record = parse_record("\x15X/Y/OV188665548C1A_1_3\x01D|").unwrap();
        assert_eq!(record.item_key(), "OV188665548C1A_1_3");
    }

    #[test]
    fn test_strip_control_bytes() {
        assert_eq!(strip_control_bytes("\x14A\x01B|\x08\x15C"), "AB|C");
    }
}
