//! Staleness reaper
//!
//! Removes markets the feed stopped refreshing. Off by default. It only ever
//! deletes; suspension flags are never touched.

use tracing::debug;

use super::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleReaper {
    enabled: bool,
    timeout_secs: i64,
}

impl StaleReaper {
    pub fn new(enabled: bool, timeout_secs: i64) -> Self {
        Self {
            enabled,
            timeout_secs,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }

    /// Remove markets of one event whose `last_seen` is at least the timeout
    /// old. Markets never touched (`last_seen == 0`) are left alone.
    pub fn sweep(&self, store: &mut EntityStore, event_id: &str, now: i64) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let Some(event) = store.event_mut(event_id) else {
            return Vec::new();
        };

        let stale: Vec<String> = event
            .markets
            .iter()
            .filter(|(_, m)| m.last_seen > 0 && now - m.last_seen >= self.timeout_secs)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            event.markets.shift_remove(key);
        }
        if !stale.is_empty() {
            debug!(event_id = %event_id, removed = stale.len(), "Removed stale markets");
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Market, Selection};

    fn store_with_markets() -> EntityStore {
        let mut store = EntityStore::new();
        let event = store.ensure_event("E1");

        let mut old = Market::new("Old");
        old.touch(100);
        let mut sel = Selection::new();
        sel.apply_suspension_signal(Some(true));
        old.selections.insert("s".to_string(), sel);
        event.markets.insert("Old".to_string(), old);

        let mut fresh = Market::new("Fresh");
        fresh.touch(250);
        event.markets.insert("Fresh".to_string(), fresh);
        store
    }

    #[test]
    fn test_sweep_removes_only_stale() {
        let mut store = store_with_markets();
        let reaper = StaleReaper::new(true, 120);

        let removed = reaper.sweep(&mut store, "E1", 300);
        assert_eq!(removed, vec!["Old".to_string()]);
        assert!(store.event("E1").unwrap().markets.contains_key("Fresh"));
    }

    #[test]
    fn test_disabled_sweep_is_noop() {
        let mut store = store_with_markets();
        let reaper = StaleReaper::new(false, 1);
        assert!(reaper.sweep(&mut store, "E1", 10_000).is_empty());
        assert_eq!(store.event("E1").unwrap().markets.len(), 2);
    }

    #[test]
    fn test_sweep_unknown_event() {
        let mut store = EntityStore::new();
        assert!(StaleReaper::new(true, 1).sweep(&mut store, "nope", 10).is_empty());
    }
}
