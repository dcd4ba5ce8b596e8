//! Sparse selection deltas
//!
//! A delta carries only the fields that changed. Absent fields keep their
//! stored value; `HA`/`HD` are the exception, their presence alone means the
//! line was re-sent and an empty value clears it.

use crate::domain::{clean_line, clean_str, Event, Market, Selection};
use crate::protocol::{RawFields, SelectionFields};

use super::correlator::MarketPointer;

/// The fields of one `U` record aimed at a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    /// Full record key, kept as the selection token
    pub token: Option<String>,
    pub odds: Option<String>,
    pub line_ha: Option<String>,
    pub line_hd: Option<String>,
    pub order: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub suspended: Option<bool>,
}

impl SelectionPatch {
    pub fn from_fields(record_key: &str, fields: &RawFields) -> Self {
        let sf = SelectionFields::from_fields(fields);
        let suspended = sf.suspension_signal();
        Self {
            token: clean_str(Some(record_key)),
            odds: sf.odds,
            line_ha: sf.line_ha,
            line_hd: sf.line_hd,
            order: sf.order,
            name: sf.name,
            category: sf.category,
            suspended,
        }
    }

    /// Patch a stored selection in place. Applying the same patch twice
    /// leaves the selection as after the first application.
    pub fn apply_to(&self, selection: &mut Selection, selection_id: &str) {
        if let Some(odds) = clean_str(self.odds.as_deref()) {
            selection.set_odds(odds);
        }
        if let Some(raw) = &self.line_ha {
            selection.line_ha = clean_line(Some(raw));
        }
        if let Some(raw) = &self.line_hd {
            selection.line_hd = clean_line(Some(raw));
        }
        selection.apply_suspension_signal(self.suspended);

        if let Some(order) = clean_str(self.order.as_deref()) {
            selection.order = Some(order);
        }
        if let Some(name) = clean_str(self.name.as_deref()) {
            selection.name = Some(name);
        }
        if let Some(category) = clean_str(self.category.as_deref()) {
            selection.category = Some(category);
        }

        selection.id = Some(selection_id.to_string());
        if let Some(token) = &self.token {
            selection.token = Some(token.clone());
        }
    }
}

/// Key of the selection a delta addresses: stored under the id, carrying the
/// id, or carrying a token that ends in `-<id>`.
fn find_selection_key(market: &Market, selection_id: &str) -> Option<String> {
    if market.selections.contains_key(selection_id) {
        return Some(selection_id.to_string());
    }
    let needle = format!("-{}", selection_id);
    market
        .selections
        .iter()
        .find(|(_, sel)| {
            sel.id.as_deref() == Some(selection_id)
                || sel.token.as_deref().is_some_and(|t| t.contains(&needle))
        })
        .map(|(key, _)| key.clone())
}

/// Patch every market of the event holding the selection. A selection found
/// under another key is re-keyed under its id in place. Returns whether
/// anything matched.
pub fn apply_selection_patch(
    event: &mut Event,
    selection_id: &str,
    patch: &SelectionPatch,
    now: i64,
) -> bool {
    let mut applied = false;

    for market in event.markets.values_mut() {
        let Some(key) = find_selection_key(market, selection_id) else {
            continue;
        };

        if key != selection_id {
            if let Some((index, _, selection)) = market.selections.shift_remove_full(&key) {
                market
                    .selections
                    .shift_insert(index, selection_id.to_string(), selection);
            }
        }
        if let Some(selection) = market.selections.get_mut(selection_id) {
            patch.apply_to(selection, selection_id);
            selection.touch(now);
        }
        market.touch(now);
        applied = true;
    }

    applied
}

/// Fabricate a selection for a delta with no stored target. It lands in the
/// fixture's current market when one is known, else in `FI:<fixture>`.
/// Returns the market key used.
pub fn insert_provisional(
    event: &mut Event,
    fixture: &str,
    pointer: Option<&MarketPointer>,
    selection_id: &str,
    patch: &SelectionPatch,
    now: i64,
) -> String {
    let key = pointer
        .map(|p| p.key.clone())
        .unwrap_or_else(|| format!("FI:{}", fixture));

    let market = event.markets.entry(key.clone()).or_insert_with(|| {
        let mut market = Market::new(pointer.map(|p| p.name.as_str()).unwrap_or(&key));
        market.market_id = pointer.and_then(|p| p.market_id.clone());
        market.token = pointer.and_then(|p| p.token.clone());
        market
    });

    let mut selection = Selection::new();
    patch.apply_to(&mut selection, selection_id);
    selection.touch(now);
    market.selections.insert(selection_id.to_string(), selection);
    market.touch(now);

    key
}
