//! "Next goal" market lookup
//!
//! With a score of `6-5` the next goal is the 12th, so the market to show is
//! `12th Goal`. The feed sometimes names it `Next Goal` instead.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use super::aggregator::{MarketView, SelectionView};

static RE_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*[-:]\s*(\d+)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextGoalReason {
    ExactMatch,
    FallbackNextGoal,
    ContainsMatch,
    NotFoundInSnapshot,
    InvalidScore,
    NoMarketsOrInvalidNextN,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextGoalView {
    pub expected_market: Option<String>,
    pub market_name_found: Option<String>,
    pub selections: Vec<SelectionView>,
    pub reason: NextGoalReason,
}

impl NextGoalView {
    fn missing(expected_market: Option<String>, reason: NextGoalReason) -> Self {
        Self {
            expected_market,
            market_name_found: None,
            selections: Vec::new(),
            reason,
        }
    }
}

/// Total goals of a `home-away` (or `home:away`) score
pub fn total_goals(score: &str) -> Option<u32> {
    let caps = RE_SCORE.captures(score)?;
    let home: u32 = caps[1].parse().ok()?;
    let away: u32 = caps[2].parse().ok()?;
    home.checked_add(away)
}

/// English ordinal: `1st`, `2nd`, `3rd`, `4th`, `11th`, `12th`, `13th`, `21st`
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn find_case_insensitive<'a>(
    markets: &'a IndexMap<String, MarketView>,
    wanted: &str,
) -> Option<(&'a String, &'a MarketView)> {
    let wanted = wanted.trim().to_lowercase();
    markets
        .iter()
        .find(|(name, _)| name.trim().to_lowercase() == wanted)
}

/// Find the market for the goal after `score`. Exact ordinal name first,
/// then `Next Goal`, then any market containing the ordinal and "goal".
pub fn resolve_next_goal(markets: &IndexMap<String, MarketView>, score: &str) -> NextGoalView {
    let Some(next) = total_goals(score).and_then(|total| total.checked_add(1)) else {
        return NextGoalView::missing(None, NextGoalReason::InvalidScore);
    };
    if markets.is_empty() {
        return NextGoalView::missing(None, NextGoalReason::NoMarketsOrInvalidNextN);
    }

    let ordinal = ordinal(next);
    let expected = format!("{} Goal", ordinal);

    let found = |name: &String, market: &MarketView, reason| NextGoalView {
        expected_market: Some(expected.clone()),
        market_name_found: Some(name.clone()),
        selections: market.selections.clone(),
        reason,
    };

    if let Some((name, market)) = find_case_insensitive(markets, &expected) {
        return found(name, market, NextGoalReason::ExactMatch);
    }
    if let Some((name, market)) = find_case_insensitive(markets, "Next Goal") {
        return found(name, market, NextGoalReason::FallbackNextGoal);
    }

    let ordinal_lower = ordinal.to_lowercase();
    markets
        .iter()
        .find(|(name, _)| {
            let name = name.to_lowercase();
            name.contains(&ordinal_lower) && name.contains("goal")
        })
        .map(|(name, market)| found(name, market, NextGoalReason::ContainsMatch))
        .unwrap_or_else(|| {
            NextGoalView::missing(Some(expected.clone()), NextGoalReason::NotFoundInSnapshot)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(name: &str) -> MarketView {
        MarketView {
            name: name.to_string(),
            market_id: None,
            token: None,
            line: None,
            order: None,
            style: None,
            layout: None,
            columns: None,
            suspended: false,
            last_seen: 0,
            selections: Vec::new(),
        }
    }

    fn markets(names: &[&str]) -> IndexMap<String, MarketView> {
        names.iter().map(|n| (n.to_string(), market(n))).collect()
    }

    #[test]
    fn test_ordinals() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 111, 112].iter().map(|n| ordinal(*n)).collect();
        assert_eq!(
            got,
            vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "111th", "112th"]
        );
    }

    #[test]
    fn test_total_goals() {
        assert_eq!(total_goals("2-1"), Some(3));
        assert_eq!(total_goals(" 6 : 5 "), Some(11));
        assert_eq!(total_goals(""), None);
        assert_eq!(total_goals("2-1-0"), None);
    }

    #[test]
    fn test_fallback_chain() {
        let view = resolve_next_goal(&markets(&["4th goal", "Next Goal"]), "2-1");
        assert_eq!(view.reason, NextGoalReason::ExactMatch);
        assert_eq!(view.expected_market.as_deref(), Some("4th Goal"));
        assert_eq!(view.market_name_found.as_deref(), Some("4th goal"));

        let view = resolve_next_goal(&markets(&["Fulltime Result", "Next Goal"]), "2-1");
        assert_eq!(view.reason, NextGoalReason::FallbackNextGoal);

        let view = resolve_next_goal(&markets(&["4th Goal [123]"]), "2-1");
        assert_eq!(view.reason, NextGoalReason::ContainsMatch);

        let view = resolve_next_goal(&markets(&["Fulltime Result"]), "2-1");
        assert_eq!(view.reason, NextGoalReason::NotFoundInSnapshot);
        assert_eq!(view.expected_market.as_deref(), Some("4th Goal"));
        assert!(view.selections.is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            resolve_next_goal(&markets(&["Next Goal"]), "abc").reason,
            NextGoalReason::InvalidScore
        );
        assert_eq!(
            resolve_next_goal(&IndexMap::new(), "0-0").reason,
            NextGoalReason::NoMarketsOrInvalidNextN
        );
    }
}
