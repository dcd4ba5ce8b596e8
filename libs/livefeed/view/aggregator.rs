//! Read-view aggregation
//!
//! Projects the entity store into the shape consumers read. Nothing in here
//! mutates engine state: placeholders are filtered, selections sorted and
//! named, market suspension derived and market names made unique.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::{clean_line, clean_str, Event, Market, Selection};
use crate::engine::normalize_market_name;

use super::clock::{match_time, period, Period};
use super::naming::{synthesize_name, NamingInput};
use super::next_goal::{resolve_next_goal, NextGoalView};

/// Rank of selections without a parseable order
const UNORDERED: i64 = 999_999;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub id: Option<String>,
    pub token: Option<String>,
    pub name: Option<String>,
    pub odds: Option<String>,
    pub odds_decimal: Option<f64>,
    pub order: Option<String>,
    pub line_ha: Option<String>,
    pub line_hd: Option<String>,
    pub category: Option<String>,
    pub suspended: bool,
    pub last_seen: i64,
}

impl SelectionView {
    fn from_selection(selection: &Selection) -> Self {
        Self {
            id: clean_str(selection.id.as_deref()),
            token: clean_str(selection.token.as_deref()),
            name: clean_str(selection.name.as_deref()),
            odds: clean_str(selection.odds.as_deref()),
            odds_decimal: selection.odds_decimal,
            order: clean_str(selection.order.as_deref()),
            line_ha: clean_line(selection.line_ha.as_deref()),
            line_hd: clean_line(selection.line_hd.as_deref()),
            category: clean_str(selection.category.as_deref()),
            suspended: selection.suspended(),
            last_seen: selection.last_seen,
        }
    }

    fn order_rank(&self) -> i64 {
        self.order
            .as_deref()
            .and_then(|o| o.trim().parse().ok())
            .unwrap_or(UNORDERED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketView {
    pub name: String,
    pub market_id: Option<String>,
    pub token: Option<String>,
    pub line: Option<String>,
    pub order: Option<String>,
    pub style: Option<String>,
    pub layout: Option<String>,
    pub columns: Option<String>,
    /// At least one selection and every selection suspended
    pub suspended: bool,
    pub last_seen: i64,
    pub selections: Vec<SelectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub event_id: String,
    pub event: String,
    pub league: String,
    pub time: String,
    pub score: String,
    pub period: Period,
    pub match_url: Option<String>,
    pub markets: IndexMap<String, MarketView>,
    pub next_goal: NextGoalView,
}

/// Build the view of one market.
pub fn build_market_view(market: &Market, event_name: &str) -> MarketView {
    let mut seen = HashSet::new();
    let mut selections: Vec<SelectionView> = market
        .selections
        .values()
        .filter(|sel| !sel.is_placeholder() && !sel.is_empty())
        .filter(|sel| match sel.identity() {
            Some(identity) => seen.insert(identity.trim().to_string()),
            None => true,
        })
        .map(SelectionView::from_selection)
        .collect();

    selections.sort_by(|a, b| {
        a.order_rank()
            .cmp(&b.order_rank())
            .then_with(|| a.name.as_deref().unwrap_or_default().cmp(b.name.as_deref().unwrap_or_default()))
    });

    let market_line = clean_str(market.line.as_deref());
    let total = selections.len();
    for (position, selection) in selections.iter_mut().enumerate() {
        if selection.name.is_some() {
            continue;
        }
        let line = selection
            .line_ha
            .as_deref()
            .or(selection.line_hd.as_deref())
            .or(market_line.as_deref());
        selection.name = synthesize_name(
            &market.name,
            event_name,
            NamingInput {
                category: selection.category.as_deref(),
                line,
                position,
                total,
            },
        );
    }

    let suspended = !selections.is_empty() && selections.iter().all(|s| s.suspended);

    MarketView {
        name: normalize_market_name(Some(market.name.as_str())),
        market_id: clean_str(market.market_id.as_deref()),
        token: clean_str(market.token.as_deref()),
        line: market_line,
        order: clean_str(market.order.as_deref()),
        style: clean_str(market.style.as_deref()),
        layout: clean_str(market.layout.as_deref()),
        columns: clean_str(market.columns.as_deref()),
        suspended,
        last_seen: market.last_seen,
        selections,
    }
}

/// Key the markets of an event by display name. Collisions get the market id,
/// else the token, else a `(#n)` counter.
pub fn markets_by_name(markets: &IndexMap<String, Market>, event_name: &str) -> IndexMap<String, MarketView> {
    let mut out: IndexMap<String, MarketView> = IndexMap::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    for market in markets.values() {
        let view = build_market_view(market, event_name);
        let name = view.name.clone();

        let mut key = name.clone();
        if out.contains_key(&key) {
            key = match (&view.market_id, &view.token) {
                (Some(id), _) => format!("{} [{}]", name, id),
                (None, Some(token)) => format!("{} [{}]", name, token),
                (None, None) => {
                    let count = counters.entry(name.clone()).or_insert(0);
                    *count += 1;
                    format!("{} (#{})", name, *count + 1)
                }
            };
        }

        let base = key.clone();
        let mut n = 2;
        while out.contains_key(&key) {
            key = format!("{} (#{})", base, n);
            n += 1;
        }

        out.insert(key, view);
    }

    out
}

/// Build the full view of one event.
pub fn build_event_view(event: &Event, match_url: Option<String>, now: i64) -> EventView {
    let markets = markets_by_name(&event.markets, &event.name);
    let next_goal = resolve_next_goal(&markets, &event.score);

    EventView {
        event_id: event.id.clone(),
        event: event.name.clone(),
        league: event.league.clone(),
        time: match_time(&event.clock, now),
        score: event.score.clone(),
        period: period(&event.clock, &event.league),
        match_url,
        markets,
        next_goal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(id: Option<&str>, name: Option<&str>, odds: Option<&str>, order: Option<&str>) -> Selection {
        let mut sel = Selection::new();
        sel.id = id.map(str::to_string);
        sel.name = name.map(str::to_string);
        sel.order = order.map(str::to_string);
        if let Some(odds) = odds {
            sel.set_odds(odds.to_string());
        }
        sel
    }

    #[test]
    fn test_placeholder_filtered_but_line_kept() {
        let mut market = Market::new("Goal Line");
        market.line = Some("4.5".to_string());
        market
            .selections
            .insert("4.5||".to_string(), selection(None, Some("4.5"), None, None));
        market
            .selections
            .insert("1".to_string(), selection(Some("1"), None, Some("1/2"), Some("0")));

        let view = build_market_view(&market, "A v B");
        assert_eq!(view.line.as_deref(), Some("4.5"));
        assert_eq!(view.selections.len(), 1);
        assert_eq!(view.selections[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_sorted_by_order_then_name() {
        let mut market = Market::new("Result");
        market.selections.insert("a".into(), selection(Some("a"), Some("Zed"), Some("2/1"), None));
        market.selections.insert("b".into(), selection(Some("b"), Some("Away"), Some("2/1"), Some("2")));
        market.selections.insert("c".into(), selection(Some("c"), Some("Home"), Some("2/1"), Some("0")));
        market.selections.insert("d".into(), selection(Some("d"), Some("Alpha"), Some("2/1"), None));

        let names: Vec<String> = build_market_view(&market, "")
            .selections
            .into_iter()
            .filter_map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Home", "Away", "Alpha", "Zed"]);
    }

    #[test]
    fn test_totals_names_from_market_line() {
        let mut market = Market::new("Match Goals");
        market.line = Some("2.5".to_string());
        market.selections.insert("1".into(), selection(Some("1"), None, Some("5/6"), Some("0")));
        market.selections.insert("2".into(), selection(Some("2"), None, Some("1/1"), Some("1")));

        let view = build_market_view(&market, "A v B");
        assert_eq!(view.selections[0].name.as_deref(), Some("Over 2.5"));
        assert_eq!(view.selections[1].name.as_deref(), Some("Under 2.5"));
    }

    #[test]
    fn test_duplicate_identities_collapse() {
        let mut market = Market::new("Result");
        market.selections.insert("x".into(), selection(Some("1"), Some("Home"), Some("2/1"), None));
        market.selections.insert("y".into(), selection(Some("1"), Some("Home"), Some("2/1"), None));
        assert_eq!(build_market_view(&market, "").selections.len(), 1);
    }

    #[test]
    fn test_market_name_collisions() {
        let mut markets = IndexMap::new();
        let mut a = Market::new("Goal Line");
        a.market_id = Some("10".to_string());
        let mut b = Market::new("Goal Line");
        b.market_id = Some("11".to_string());
        let c = Market::new("Goal Line");
        let d = Market::new("Goal Line");
        markets.insert("k1".to_string(), a);
        markets.insert("k2".to_string(), b);
        markets.insert("k3".to_string(), c);
        markets.insert("k4".to_string(), d);

        let keys: Vec<String> = markets_by_name(&markets, "").into_keys().collect();
        assert_eq!(keys, vec!["Goal Line", "Goal Line [11]", "Goal Line (#2)", "Goal Line (#3)"]);
    }

    #[test]
    fn test_market_suspended_derived_from_visible_selections() {
        let mut market = Market::new("Result");
        assert!(!build_market_view(&market, "").suspended);

        let mut sel = selection(Some("1"), Some("Home"), Some("2/1"), None);
        sel.apply_suspension_signal(Some(true));
        market.selections.insert("1".into(), sel);
        assert!(build_market_view(&market, "").suspended);
    }
}
