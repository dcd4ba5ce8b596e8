//! Identifier correlator
//!
//! Maps transient fixture ids to the stable event id. The tables live for the
//! whole process and are never cleared by a full resync: delta-only fixture
//! ids stay resolvable after their snapshot context scrolled away.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::protocol::{scan_frame_fixtures, FrameFixtures};

/// Last market header seen for a fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPointer {
    /// Key of the market inside its event
    pub key: String,
    pub name: String,
    pub market_id: Option<String>,
    pub token: Option<String>,
}

/// Process-wide correlation tables
#[derive(Debug, Default)]
pub struct Correlator {
    /// fixture id -> stable event id
    fixture_to_event: HashMap<String, String>,
    /// snapshot-style fixture id -> delta-style fixture ids seen in the same frame
    co_occurrence: BTreeMap<String, BTreeSet<String>>,
    /// selection id -> stable event id
    selection_to_event: HashMap<String, String>,
    /// fixture id -> current market pointer + metadata
    fixture_market: HashMap<String, MarketPointer>,
    /// fixture id -> event display name
    fixture_event_name: HashMap<String, String>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a raw frame and record every snapshot-style x delta-style pair.
    pub fn learn_frame(&mut self, raw: &str) -> FrameFixtures {
        let fixtures = scan_frame_fixtures(raw);
        self.learn_pairs(&fixtures);
        fixtures
    }

    /// Record co-occurring ids. Only frames carrying both styles teach anything.
    pub fn learn_pairs(&mut self, fixtures: &FrameFixtures) {
        if fixtures.snapshot_style.is_empty() || fixtures.delta_style.is_empty() {
            return;
        }
        for snapshot_id in &fixtures.snapshot_style {
            let entry = self.co_occurrence.entry(snapshot_id.clone()).or_default();
            entry.extend(fixtures.delta_style.iter().cloned());
        }
        trace!(
            snapshot = fixtures.snapshot_style.len(),
            delta = fixtures.delta_style.len(),
            "Learned fixture co-occurrence"
        );
    }

    pub fn bind_fixture(&mut self, fixture: &str, event_id: &str) {
        self.fixture_to_event
            .insert(fixture.to_string(), event_id.to_string());
    }

    pub fn bind_selection(&mut self, selection_id: &str, event_id: &str) {
        self.selection_to_event
            .insert(selection_id.to_string(), event_id.to_string());
    }

    /// Resolve a fixture id: direct map, then associated delta-style ids,
    /// then the snapshot-style id that lists this one as co-occurring.
    pub fn resolve(&self, fixture: &str) -> Option<&str> {
        let fixture = fixture.trim();
        if fixture.is_empty() {
            return None;
        }

        if let Some(event_id) = self.fixture_to_event.get(fixture) {
            return Some(event_id.as_str());
        }

        if let Some(associated) = self.co_occurrence.get(fixture) {
            if let Some(event_id) = associated
                .iter()
                .find_map(|id| self.fixture_to_event.get(id))
            {
                return Some(event_id.as_str());
            }
        }

        self.co_occurrence
            .iter()
            .filter(|(_, deltas)| deltas.contains(fixture))
            .find_map(|(snapshot_id, _)| self.fixture_to_event.get(snapshot_id))
            .map(String::as_str)
    }

    /// [`Correlator::resolve`] with the selection-id map as last resort.
    pub fn resolve_with_selection(&self, fixture: &str, selection_id: &str) -> Option<String> {
        self.resolve(fixture)
            .or_else(|| self.selection_to_event.get(selection_id).map(String::as_str))
            .map(str::to_string)
    }

    pub fn set_current_market(&mut self, fixture: &str, pointer: MarketPointer) {
        self.fixture_market.insert(fixture.to_string(), pointer);
    }

    pub fn current_market(&self, fixture: &str) -> Option<&MarketPointer> {
        self.fixture_market.get(fixture)
    }

    /// Refresh the cached id/token of the fixture's current market (`MA` segments).
    pub fn refresh_market_meta(&mut self, fixture: &str, market_id: Option<&str>, token: Option<&str>) {
        if let Some(pointer) = self.fixture_market.get_mut(fixture) {
            if let Some(id) = market_id {
                pointer.market_id = Some(id.to_string());
            }
            if let Some(token) = token {
                pointer.token = Some(token.to_string());
            }
        }
    }

    pub fn remember_event_name(&mut self, fixture: &str, name: &str) {
        self.fixture_event_name
            .insert(fixture.to_string(), name.to_string());
    }

    pub fn event_name(&self, fixture: &str) -> Option<&str> {
        self.fixture_event_name.get(fixture).map(String::as_str)
    }

    /// Number of known fixture bindings (for stats logging)
    pub fn fixture_count(&self) -> usize {
        self.fixture_to_event.len()
    }
}
