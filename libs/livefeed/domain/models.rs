//! Core domain entities: Event -> Market -> Selection

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use super::odds;

static RE_LINE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?\d+(?:\.\d+)?(?:\s*,\s*[+-]?\d+(?:\.\d+)?)?\s*$").unwrap()
});

/// A bare numeric label such as `4.5`, `-1` or `4.5,5.0`
pub fn is_line_label(text: &str) -> bool {
    RE_LINE_LABEL.is_match(text)
}

/// Trim, returning `None` for empty values
pub fn clean_str(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Line values drop every space (`"+ 1.5"` -> `"+1.5"`)
pub fn clean_line(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.replace(' ', ""))
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Selection
// =============================================================================

/// One bettable outcome inside a market
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: Option<String>,
    pub token: Option<String>,
    pub name: Option<String>,
    /// Fractional odds as sent by the feed
    pub odds: Option<String>,
    /// Derived from `odds`, `None` when unknown
    pub odds_decimal: Option<f64>,
    pub order: Option<String>,
    pub line_ha: Option<String>,
    pub line_hd: Option<String>,
    /// `N2` marker (1/X/2, Over/Under, ...)
    pub category: Option<String>,
    /// Only [`Selection::apply_suspension_signal`] writes this
    suspended: bool,
    pub last_seen: i64,
}

impl Selection {
    pub fn new() -> Self {
        Self {
            id: None,
            token: None,
            name: None,
            odds: None,
            odds_decimal: None,
            order: None,
            line_ha: None,
            line_hd: None,
            category: None,
            suspended: false,
            last_seen: 0,
        }
    }

    pub fn suspended(&self) -> bool {
        self.suspended
    }

    /// Apply an explicit `SU` signal. `None` (field absent) leaves the flag alone.
    pub fn apply_suspension_signal(&mut self, signal: Option<bool>) {
        if let Some(suspended) = signal {
            self.suspended = suspended;
        }
    }

    /// Store new odds and recompute the decimal value
    pub fn set_odds(&mut self, fractional: String) {
        self.odds_decimal = odds::to_decimal(Some(&fractional));
        self.odds = Some(fractional);
    }

    /// Identity used for de-duplication in views: id, else token
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().or(self.token.as_deref())
    }

    pub fn touch(&mut self, now: i64) {
        self.last_seen = now;
    }

    /// A line label rather than a real outcome: no id and no odds, and either
    /// a numeric name with no line components or a `C1-` token with nothing
    /// else to show.
    pub fn is_placeholder(&self) -> bool {
        let id = clean_str(self.id.as_deref());
        let odds = clean_str(self.odds.as_deref());
        if id.is_some() || odds.is_some() {
            return false;
        }

        let name = clean_str(self.name.as_deref());
        let no_lines = clean_line(self.line_ha.as_deref()).is_none()
            && clean_line(self.line_hd.as_deref()).is_none();
        let label_name = name.as_deref().is_some_and(is_line_label);

        if label_name && no_lines {
            return true;
        }

        let c1_token = self.token.as_deref().is_some_and(|t| t.contains("C1-"));
        c1_token && no_lines && (name.is_none() || label_name)
    }

    /// Nothing worth showing at all
    pub fn is_empty(&self) -> bool {
        [
            &self.id,
            &self.token,
            &self.odds,
            &self.name,
            &self.line_ha,
            &self.line_hd,
        ]
        .iter()
        .all(|v| clean_str(v.as_deref()).is_none())
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Market
// =============================================================================

/// A market of one event, keyed in the event by a synthesized name key
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub name: String,
    pub market_id: Option<String>,
    pub token: Option<String>,
    pub order: Option<String>,
    /// `SY`
    pub style: Option<String>,
    /// `PY`
    pub layout: Option<String>,
    /// `CN`
    pub columns: Option<String>,
    /// Free-text line (e.g. `"4.5"` on a goal line market)
    pub line: Option<String>,
    pub selections: IndexMap<String, Selection>,
    pub last_seen: i64,
}

impl Market {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            market_id: None,
            token: None,
            order: None,
            style: None,
            layout: None,
            columns: None,
            line: None,
            selections: IndexMap::new(),
            last_seen: 0,
        }
    }

    pub fn touch(&mut self, now: i64) {
        self.last_seen = now;
    }
}

// =============================================================================
// Event
// =============================================================================

/// Raw match-time fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchClock {
    /// `MD`: `0` first half, `1` second half
    pub period_flag: Option<String>,
    /// `TM`
    pub minutes: Option<String>,
    /// `TS`
    pub seconds: Option<String>,
    /// `TU`: `YYYYMMDDhhmmss` UTC
    pub period_start: Option<String>,
    /// `TT`: `1` while the clock runs
    pub ticking: Option<String>,
}

/// A live match, keyed by its stable id
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub internal_id: Option<String>,
    pub item_key: Option<String>,
    pub name: String,
    pub league: String,
    pub score: String,
    pub clock: MatchClock,
    pub markets: IndexMap<String, Market>,
}

impl Event {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            internal_id: None,
            item_key: None,
            name: String::new(),
            league: String::new(),
            score: String::new(),
            clock: MatchClock::default(),
            markets: IndexMap::new(),
        }
    }
}
