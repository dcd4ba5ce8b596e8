//! Entity store
//!
//! Owns the Event -> Market -> Selection hierarchy and the in-play listing.
//! The listing is the only part rebuilt by a full resync; events persist until
//! a delete record names them.

use indexmap::IndexMap;
use tracing::debug;

use crate::domain::{clean_str, Event, Market};
use crate::protocol::{non_empty, EventFields, ItemCategory};

/// Display name of markets that arrive without any name
pub const UNKNOWN_MARKET: &str = "Unknown Market";

/// Collapse runs of whitespace, falling back to [`UNKNOWN_MARKET`].
pub fn normalize_market_name(name: Option<&str>) -> String {
    let collapsed = name
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() {
        UNKNOWN_MARKET.to_string()
    } else {
        collapsed
    }
}

/// In-play listing entry: item key -> stable event id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub event_id: String,
    pub category: ItemCategory,
}

#[derive(Debug, Default)]
pub struct EntityStore {
    events: IndexMap<String, Event>,
    listing: IndexMap<String, ListingEntry>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Drop the listing ahead of a full resync. Events are kept.
    pub fn reset_listing(&mut self) {
        debug!(items = self.listing.len(), "Resetting in-play listing");
        self.listing.clear();
    }

    /// Index an event item key. Keys of unknown categories are ignored.
    pub fn list_item(&mut self, item_key: &str, event_id: &str) {
        if let Some(category) = ItemCategory::of_item(item_key) {
            self.listing.insert(
                item_key.to_string(),
                ListingEntry {
                    event_id: event_id.to_string(),
                    category,
                },
            );
        }
    }

    pub fn listed(&self, item_key: &str) -> Option<&ListingEntry> {
        self.listing.get(item_key)
    }

    /// Listing entries in arrival order
    pub fn listing(&self) -> impl Iterator<Item = (&String, &ListingEntry)> {
        self.listing.iter()
    }

    /// Remove a listing item and the event it maps to.
    pub fn delete_item(&mut self, item_key: &str) -> Option<String> {
        let entry = self.listing.shift_remove(item_key)?;
        self.listing.retain(|_, e| e.event_id != entry.event_id);
        self.events.shift_remove(&entry.event_id);
        Some(entry.event_id)
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn event(&self, event_id: &str) -> Option<&Event> {
        self.events.get(event_id)
    }

    pub fn event_mut(&mut self, event_id: &str) -> Option<&mut Event> {
        self.events.get_mut(event_id)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn event_ids(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Get or create the event with this stable id
    pub fn ensure_event(&mut self, event_id: &str) -> &mut Event {
        self.events
            .entry(event_id.to_string())
            .or_insert_with(|| Event::new(event_id))
    }

    /// Upsert an event from event fields. Non-empty values replace, empty or
    /// absent values never blank a populated field.
    pub fn upsert_event(&mut self, event_id: &str, fields: &EventFields) -> &mut Event {
        let event = self.ensure_event(event_id);
        merge_event_fields(event, fields);
        event
    }
}

/// Apply the non-empty values of `fields` onto the event header.
pub fn merge_event_fields(event: &mut Event, fields: &EventFields) {
    fn set(target: &mut String, value: &Option<String>) {
        if let Some(v) = non_empty(value) {
            *target = v.to_string();
        }
    }
    fn set_opt(target: &mut Option<String>, value: &Option<String>) {
        if let Some(v) = clean_str(value.as_deref()) {
            *target = Some(v);
        }
    }

    set(&mut event.name, &fields.name);
    set(&mut event.league, &fields.league);
    set(&mut event.score, &fields.score);
    set_opt(&mut event.internal_id, &fields.internal_id);
    set_opt(&mut event.item_key, &fields.item);
    set_opt(&mut event.clock.period_flag, &fields.period_flag);
    set_opt(&mut event.clock.minutes, &fields.minutes);
    set_opt(&mut event.clock.seconds, &fields.seconds);
    set_opt(&mut event.clock.period_start, &fields.period_start);
    set_opt(&mut event.clock.ticking, &fields.ticking);
}

/// Get or create a market under `key`.
///
/// When a market with a different id or token already owns the key, the key
/// is disambiguated as `"<key> [<id|token|alt>]"`. Returns the final key.
pub fn ensure_market(
    event: &mut Event,
    key: &str,
    name: &str,
    market_id: Option<&str>,
    token: Option<&str>,
) -> String {
    let mut key = key.to_string();

    if let Some(existing) = event.markets.get(&key) {
        let token_conflict = matches!(
            (existing.token.as_deref(), token),
            (Some(a), Some(b)) if a != b
        );
        let id_conflict = matches!(
            (existing.market_id.as_deref(), market_id),
            (Some(a), Some(b)) if a != b
        );
        if token_conflict || id_conflict {
            let suffix = market_id.or(token).unwrap_or("alt");
            key = format!("{} [{}]", key, suffix);
        }
    }

    let market = event
        .markets
        .entry(key.clone())
        .or_insert_with(|| Market::new(name));
    if !name.is_empty() {
        market.name = name.to_string();
    }
    if let Some(id) = market_id {
        market.market_id = Some(id.to_string());
    }
    if let Some(token) = token {
        market.token = Some(token.to_string());
    }

    key
}
