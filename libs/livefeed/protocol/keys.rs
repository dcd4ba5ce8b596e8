//! Identifier extraction from composite target keys.
//!
//! The feed publishes no schema for its keys, so ids are recovered by
//! pattern matching. These patterns are part of the wire contract:
//!
//! | Pattern | Meaning |
//! |---|---|
//! | `(?:^\|[^0-9])OV(\d{6,})C(?:1A\|18A\|151A)_` | snapshot-style fixture id (listing item) |
//! | `OV(\d{6,})-(\d{6,})` | delta-style fixture id (fixture-selection pair) |
//! | `(\d{6,})-(\d{6,})(?:_\|$)` | fixture + selection id of an update key |
//! | `^OV(\d{6,})C(?:1A\|18A\|151A)_` | fixture id of an event item key |

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::tokenizer::strip_control_bytes;

static RE_SNAPSHOT_FIXTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])OV(\d{6,})C(?:1A|18A|151A)_").unwrap()
});
static RE_DELTA_FIXTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"OV(\d{6,})-(\d{6,})").unwrap()
});
static RE_FIXTURE_SELECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{6,})-(\d{6,})(?:_|$)").unwrap()
});
static RE_ITEM_FIXTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^OV(\d{6,})C(?:1A|18A|151A)_").unwrap()
});

/// Listing category of an event item key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// `C1A_`
    Soccer,
    /// `C18A_`
    Basketball,
}

impl ItemCategory {
    pub fn of_item(item_key: &str) -> Option<Self> {
        if item_key.contains("C1A_") {
            Some(ItemCategory::Soccer)
        } else if item_key.contains("C18A_") {
            Some(ItemCategory::Basketball)
        } else {
            None
        }
    }
}

/// Fixture ids seen in a frame, split by identifier style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameFixtures {
    pub snapshot_style: BTreeSet<String>,
    pub delta_style: BTreeSet<String>,
}

/// Collect every snapshot-style and delta-style fixture id in a raw frame.
pub fn scan_frame_fixtures(raw: &str) -> FrameFixtures {
    let clean = strip_control_bytes(raw);
    FrameFixtures {
        snapshot_style: RE_SNAPSHOT_FIXTURE
            .captures_iter(&clean)
            .map(|c| c[1].to_string())
            .collect(),
        delta_style: RE_DELTA_FIXTURE
            .captures_iter(&clean)
            .map(|c| c[1].to_string())
            .collect(),
    }
}

/// Extract `(fixture id, selection id)` from an update key such as
/// `OV188665548-469947664_1_3` or `L188665548-469947664_1_3`.
pub fn fixture_and_selection(key: &str) -> Option<(String, String)> {
    RE_FIXTURE_SELECTION
        .captures(key)
        .map(|c| (c[1].to_string(), c[2].to_string()))
}

/// Fixture id embedded in an event item key such as `OV188665548C1A_1_3`.
pub fn item_fixture(item_key: &str) -> Option<String> {
    RE_ITEM_FIXTURE.captures(item_key).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_and_selection() {
        assert_eq!(
            fixture_and_selection("OV188665548-469947664_1_3"),
            Some(("188665548".to_string(), "469947664".to_string()))
        );
        assert_eq!(
            fixture_and_selection("L188665548-469947664"),
            Some(("188665548".to_string(), "469947664".to_string()))
        );
        assert_eq!(fixture_and_selection("OV188665548C1A_1_3"), None);
        assert_eq!(fixture_and_selection("OV12-34_1_3"), None);
    }

    #[test]
    fn test_scan_frame_fixtures() {
        let raw = "\x14OVInPlay_1_3\x01F|EV;IT=OV111111111C1A_1_3;|\x08\x15OV222222222-333333333_1_3\x01U|OD=1/2;";
        let found = scan_frame_fixtures(raw);

        assert!(found.snapshot_style.contains("111111111"));
        assert!(found.delta_style.contains("222222222"));
        assert!(!found.delta_style.contains("111111111"));
    }

    #[test]
    fn test_snapshot_style_requires_non_digit_before_ov() {
        let found = scan_frame_fixtures("9OV111111111C1A_");
        assert!(found.snapshot_style.is_empty());

        let found = scan_frame_fixtures("=OV111111111C18A_");
        assert!(found.snapshot_style.contains("111111111"));
    }

    #[test]
    fn test_item_fixture_and_category() {
        assert_eq!(item_fixture("OV188665548C1A_1_3"), Some("188665548".to_string()));
        assert_eq!(item_fixture("XOV188665548C1A_1_3"), None);
        assert_eq!(ItemCategory::of_item("OV1C1A_1_3"), Some(ItemCategory::Soccer));
        assert_eq!(ItemCategory::of_item("OV1C18A_1_3"), Some(ItemCategory::Basketball));
        assert_eq!(ItemCategory::of_item("OV1C151A_1_3"), None);
    }
}
