//! Segment decoder
//!
//! Snapshot payloads are `|`-separated parts of the form `TG;KEY=VALUE;...`
//! where `TG` is a two character tag. The typed field records below replace
//! the raw key/value maps while keeping unknown keys in a residual bag.

use std::collections::BTreeMap;

/// Flat key/value map decoded from a `KEY=VALUE;` body
pub type RawFields = BTreeMap<String, String>;

/// Two character segment tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentTag {
    /// `EV`
    Event,
    /// `MG`
    MarketHeader,
    /// `MA`
    MarketConfig,
    /// `PA`
    Selection,
    /// Any other tag (`CL`, `CT`, `TG`, `TE`, `SC`, `SL`, ...)
    Other(String),
}

impl SegmentTag {
    pub fn from_code(code: &str) -> Self {
        match code {
            "EV" => SegmentTag::Event,
            "MG" => SegmentTag::MarketHeader,
            "MA" => SegmentTag::MarketConfig,
            "PA" => SegmentTag::Selection,
            other => SegmentTag::Other(other.to_string()),
        }
    }
}

/// Decoded unit inside a snapshot payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tag: SegmentTag,
    pub fields: RawFields,
}

/// Parse a `KEY=VALUE;KEY=VALUE;` body.
///
/// Leading/trailing `|` and a trailing `;` are tolerated, items without `=`
/// are skipped and the value is split at the first `=` only.
pub fn parse_fields(body: &str) -> RawFields {
    let mut out = RawFields::new();

    let body = body.trim();
    let body = body.strip_prefix('|').unwrap_or(body);
    let body = body.strip_suffix('|').unwrap_or(body);
    let body = body.strip_suffix(';').unwrap_or(body);

    for item in body.split(';') {
        if let Some((key, value)) = item.split_once('=') {
            out.insert(key.to_string(), value.to_string());
        }
    }

    out
}

/// Decode a payload into its segments, in wire order.
///
/// Parts shorter than three characters or without `;` at offset 2 are skipped.
pub fn decode_segments(payload: &str) -> Vec<Segment> {
    payload
        .split('|')
        .filter_map(|part| {
            let part = part.trim();
            if part.len() < 3 || part.as_bytes()[2] != b';' {
                return None;
            }
            Some(Segment {
                tag: SegmentTag::from_code(&part[..2]),
                fields: parse_fields(&part[3..]),
            })
        })
        .collect()
}

/// Quick check used before scanning a whole frame for entity segments.
pub fn contains_entity_segments(text: &str) -> bool {
    ["EV;", "MG;", "MA;", "PA;"].iter().any(|tag| text.contains(tag))
}

// =============================================================================
// Typed field records
// =============================================================================

/// Removes named keys from a copy of the raw map; what remains is the residual.
struct FieldTaker(RawFields);

impl FieldTaker {
    fn take(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    fn residual(self) -> RawFields {
        self.0
    }
}

/// Returns the value only when it is non-empty after trimming.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Fields of an `EV` segment (also used for event header deltas)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    /// `IT` item key
    pub item: Option<String>,
    /// `OI` internal id
    pub internal_id: Option<String>,
    /// `C2` stable event id
    pub stable_id: Option<String>,
    /// `FI` fixture id
    pub fixture: Option<String>,
    /// `ID`
    pub id: Option<String>,
    /// `NA`
    pub name: Option<String>,
    /// `CT`
    pub league: Option<String>,
    /// `SS`
    pub score: Option<String>,
    /// `MD` period flag
    pub period_flag: Option<String>,
    /// `TM`
    pub minutes: Option<String>,
    /// `TS`
    pub seconds: Option<String>,
    /// `TU` period start timestamp
    pub period_start: Option<String>,
    /// `TT` timer ticking flag
    pub ticking: Option<String>,
    /// `UC` update cause
    pub update_cause: Option<String>,
    pub extra: RawFields,
}

impl EventFields {
    pub fn from_fields(fields: &RawFields) -> Self {
        let mut t = FieldTaker(fields.clone());
        Self {
            item: t.take("IT"),
            internal_id: t.take("OI"),
            stable_id: t.take("C2"),
            fixture: t.take("FI"),
            id: t.take("ID"),
            name: t.take("NA"),
            league: t.take("CT"),
            score: t.take("SS"),
            period_flag: t.take("MD"),
            minutes: t.take("TM"),
            seconds: t.take("TS"),
            period_start: t.take("TU"),
            ticking: t.take("TT"),
            update_cause: t.take("UC"),
            extra: t.residual(),
        }
    }

    /// Fixture id of the event: `FI`, else `ID`
    pub fn fixture_id(&self) -> Option<&str> {
        non_empty(&self.fixture).or_else(|| non_empty(&self.id))
    }
}

/// Fields of an `MG` (header) or `MA` (config) segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFields {
    /// `ID`
    pub id: Option<String>,
    /// `MA`
    pub market_alt_id: Option<String>,
    /// `IT` token
    pub token: Option<String>,
    /// `NA`
    pub name: Option<String>,
    /// `MN`
    pub alt_name: Option<String>,
    /// `FI`
    pub fixture: Option<String>,
    /// `OR`
    pub order: Option<String>,
    /// `SY` style code
    pub style: Option<String>,
    /// `PY` layout code
    pub layout: Option<String>,
    /// `CN` column count
    pub columns: Option<String>,
    pub extra: RawFields,
}

impl MarketFields {
    pub fn from_fields(fields: &RawFields) -> Self {
        let mut t = FieldTaker(fields.clone());
        Self {
            id: t.take("ID"),
            market_alt_id: t.take("MA"),
            token: t.take("IT"),
            name: t.take("NA"),
            alt_name: t.take("MN"),
            fixture: t.take("FI"),
            order: t.take("OR"),
            style: t.take("SY"),
            layout: t.take("PY"),
            columns: t.take("CN"),
            extra: t.residual(),
        }
    }

    /// Display name: `NA`, else `MN`, else `ID`
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
            .or_else(|| non_empty(&self.alt_name))
            .or_else(|| non_empty(&self.id))
    }

    /// Market id: `ID`, else `MA`
    pub fn market_id(&self) -> Option<&str> {
        non_empty(&self.id).or_else(|| non_empty(&self.market_alt_id))
    }
}

/// Fields of a `PA` segment or a selection delta
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionFields {
    /// `ID`
    pub id: Option<String>,
    /// `IT` token
    pub token: Option<String>,
    /// `FI`
    pub fixture: Option<String>,
    /// `NA`
    pub name: Option<String>,
    /// `OD` fractional odds
    pub odds: Option<String>,
    /// `HA` line component
    pub line_ha: Option<String>,
    /// `HD` line component
    pub line_hd: Option<String>,
    /// `OR` order rank
    pub order: Option<String>,
    /// `N2` category marker
    pub category: Option<String>,
    /// `SU` explicit suspension signal
    pub suspended: Option<String>,
    pub extra: RawFields,
}

impl SelectionFields {
    pub fn from_fields(fields: &RawFields) -> Self {
        let mut t = FieldTaker(fields.clone());
        Self {
            id: t.take("ID"),
            token: t.take("IT"),
            fixture: t.take("FI"),
            name: t.take("NA"),
            odds: t.take("OD"),
            line_ha: t.take("HA"),
            line_hd: t.take("HD"),
            order: t.take("OR"),
            category: t.take("N2"),
            suspended: t.take("SU"),
            extra: t.residual(),
        }
    }

    /// Explicit suspension signal, `None` when `SU` is absent
    pub fn suspension_signal(&self) -> Option<bool> {
        self.suspended.as_deref().map(|su| su.trim() == "1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_grammar() {
        let fields = parse_fields("A=1;B=;C=x=y;junk;D=4");
        assert_eq!(fields.get("A").map(String::as_str), Some("1"));
        assert_eq!(fields.get("B").map(String::as_str), Some(""));
        assert_eq!(fields.get("C").map(String::as_str), Some("x=y"));
        assert_eq!(fields.get("D").map(String::as_str), Some("4"));
        assert!(!fields.contains_key("junk"));
    }

    #[test]
    fn test_parse_fields_strips_pipes_and_trailing_separator() {
        let fields = parse_fields("|OD=5/2;SU=0;|");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["OD"], "5/2");
        assert_eq!(fields["SU"], "0");
        assert!(parse_fields("").is_empty());
    }

    #[test]
    fn test_decode_segments_in_order() {
        let segments = decode_segments("X|EV;C2=1;NA=A v B;|MG;ID=5;NA=Match Goals;|ZZ|PA;ID=9;OD=1/2;|XY;Q=1");

        let tags: Vec<SegmentTag> = segments.iter().map(|s| s.tag.clone()).collect();
        assert_eq!(
            tags,
            vec![
                SegmentTag::Event,
                SegmentTag::MarketHeader,
                SegmentTag::Selection,
                SegmentTag::Other("XY".to_string()),
            ]
        );
        assert_eq!(segments[0].fields["NA"], "A v B");
    }

    #[test]
    fn test_typed_fields_keep_residual_keys() {
        let raw = parse_fields("ID=9;OD=1/2;SU=1;ZZ=opaque;");
        let sel = SelectionFields::from_fields(&raw);

        assert_eq!(sel.id.as_deref(), Some("9"));
        assert_eq!(sel.suspension_signal(), Some(true));
        assert_eq!(sel.extra.get("ZZ").map(String::as_str), Some("opaque"));
        assert!(sel.name.is_none());
    }

    #[test]
    fn test_suspension_signal_absent_vs_zero() {
        let absent = SelectionFields::from_fields(&parse_fields("OD=2/1;"));
        assert_eq!(absent.suspension_signal(), None);

        let zero = SelectionFields::from_fields(&parse_fields("SU=0;"));
        assert_eq!(zero.suspension_signal(), Some(false));
    }

    #[test]
    fn test_market_display_name_fallbacks() {
        let m = MarketFields::from_fields(&parse_fields("ID=77;MN=Alt;"));
        assert_eq!(m.display_name(), Some("Alt"));

        let m = MarketFields::from_fields(&parse_fields("MA=12;"));
        assert_eq!(m.display_name(), None);
        assert_eq!(m.market_id(), Some("12"));
    }
}
