//! Display names for nameless selections
//!
//! Handicap and totals markets often send selections without `NA`; the name
//! is rebuilt from the event title, the `N2` marker, the line and position.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::clean_str;

static RE_VERSUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:v|vs\.?|x)\s+").unwrap());

/// Split `"A v B"`, `"A vs B"` or `"A x B"` into home and away.
pub fn parse_home_away(event_name: &str) -> (Option<String>, Option<String>) {
    let mut parts = RE_VERSUS.split(event_name.trim());
    match (parts.next(), parts.next()) {
        (Some(home), Some(away)) => (clean_str(Some(home)), clean_str(Some(away))),
        _ => (None, None),
    }
}

/// `"Over"`/`"Under"` from an `N2` marker
pub fn infer_over_under(category: Option<&str>) -> Option<&'static str> {
    let marker = clean_str(category)?.to_uppercase();
    match marker.as_str() {
        "O" | "OVER" | "OV" | "O/U" | "OU" | "O U" => Some("Over"),
        "U" | "UNDER" | "UN" | "UND" => Some("Under"),
        m if m.contains("OVER") => Some("Over"),
        m if m.contains("UNDER") => Some("Under"),
        _ => None,
    }
}

pub fn is_handicap_market(market_name: &str) -> bool {
    market_name.to_lowercase().contains("handicap")
}

/// `Match Goals`, `Goal Line` or any `... Goals` market
pub fn is_totals_market(market_name: &str) -> bool {
    let name = market_name.trim().to_lowercase();
    name.contains("match goals") || name.contains("goal line") || name.ends_with(" goals")
}

/// What naming needs to know about one selection
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingInput<'a> {
    pub category: Option<&'a str>,
    /// Selection line (`HA`, else `HD`), else the market's line
    pub line: Option<&'a str>,
    pub position: usize,
    pub total: usize,
}

/// Synthesize a name for a nameless selection, `None` when nothing fits.
pub fn synthesize_name(market_name: &str, event_name: &str, input: NamingInput<'_>) -> Option<String> {
    let (home, away) = parse_home_away(event_name);
    let NamingInput {
        category,
        line,
        position,
        total,
    } = input;

    if is_handicap_market(market_name) {
        if total >= 3 {
            return Some(match position {
                0 => home.unwrap_or_else(|| "Home".to_string()),
                1 => "Draw".to_string(),
                _ => away.unwrap_or_else(|| "Away".to_string()),
            });
        }
        if total == 2 {
            return Some(if position == 0 {
                home.unwrap_or_else(|| "Home".to_string())
            } else {
                away.unwrap_or_else(|| "Away".to_string())
            });
        }
    }

    if is_totals_market(market_name) {
        let side = infer_over_under(category).or(match (total, position) {
            (2, 0) => Some("Over"),
            (2, _) => Some("Under"),
            _ => None,
        });
        if let Some(side) = side {
            return Some(match line {
                Some(line) => format!("{} {}", side, line),
                None => side.to_string(),
            });
        }
    }

    match (total >= 3, home, away) {
        (true, Some(home), Some(away)) => Some(match position {
            0 => home,
            1 => "Draw".to_string(),
            _ => away,
        }),
        _ => None,
    }
}
