//! Property-based tests for delta patching
//!
//! Uses proptest to check the patch laws over arbitrary odds deltas.
//!
//! Run with: cargo test -p livefeed patch_properties

mod common;

use common::*;
use livefeed::{EngineSettings, Event, FeedState};
use proptest::prelude::*;

const SELECTIONS: [&str; 3] = ["900001", "900002", "900003"];

fn seeded_state() -> FeedState {
    let mut state = FeedState::new(&EngineSettings::default());
    state.ingest_frame(&listing_frame(EVENT_ID, FIXTURE, "0-0"), 1_000);
    state.ingest_frame(
        &markets_frame(
            EVENT_ID,
            FIXTURE,
            &[
                "MG;ID=1777;NA=Fulltime Result;",
                "PA;ID=900001;NA=Home;OD=6/4;OR=0;",
                "PA;ID=900002;NA=Draw;OD=12/5;OR=1;SU=1;",
                "PA;ID=900003;NA=Away;OD=7/4;OR=2;",
            ],
        ),
        1_001,
    );
    state
}

fn event(state: &FeedState) -> Event {
    state.store().event(EVENT_ID).cloned().expect("seeded event")
}

fn odds_strategy() -> impl Strategy<Value = String> {
    (1u32..50, 1u32..20).prop_map(|(num, den)| format!("{}/{}", num, den))
}

fn delta_strategy() -> impl Strategy<Value = (usize, String)> {
    (0..SELECTIONS.len(), odds_strategy())
}

fn odds_delta(index: usize, odds: &str) -> String {
    update_record(&selection_key(FIXTURE, SELECTIONS[index]), &format!("OD={};", odds))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying the same delta twice equals applying it once
    #[test]
    fn delta_is_idempotent((index, odds) in delta_strategy()) {
        let raw = odds_delta(index, &odds);

        let mut once = seeded_state();
        once.ingest_frame(&raw, 1_010);

        let mut twice = seeded_state();
        twice.ingest_frame(&raw, 1_010);
        twice.ingest_frame(&raw, 1_010);

        prop_assert_eq!(event(&once), event(&twice));
    }

    /// An odds-only delta changes odds and freshness of one selection, nothing else
    #[test]
    fn delta_only_touches_sent_fields((index, odds) in delta_strategy()) {
        let mut state = seeded_state();
        let before = event(&state);
        state.ingest_frame(&odds_delta(index, &odds), 1_010);
        let after = event(&state);

        let sid = SELECTIONS[index];
        let market_before = &before.markets["Fulltime Result"];
        let market_after = &after.markets["Fulltime Result"];
        prop_assert_eq!(market_before.selections.len(), market_after.selections.len());

        for (key, old) in &market_before.selections {
            let new = &market_after.selections[key.as_str()];
            if key == sid {
                prop_assert_eq!(new.odds.as_deref(), Some(odds.as_str()));
                prop_assert_eq!(new.name.as_ref(), old.name.as_ref());
                prop_assert_eq!(new.order.as_ref(), old.order.as_ref());
                prop_assert_eq!(new.suspended(), old.suspended());
                prop_assert_eq!(new.last_seen, 1_010);
            } else {
                prop_assert_eq!(new, old);
            }
        }
        prop_assert_eq!(&after.name, &before.name);
        prop_assert_eq!(&after.score, &before.score);
    }

    /// Suspension flags survive any sequence of deltas without `SU`
    #[test]
    fn suspension_needs_explicit_signal(deltas in prop::collection::vec(delta_strategy(), 1..20)) {
        let mut state = seeded_state();
        for (i, (index, odds)) in deltas.iter().enumerate() {
            state.ingest_frame(&odds_delta(*index, odds), 1_010 + i as i64);
        }

        let after = event(&state);
        let market = &after.markets["Fulltime Result"];
        prop_assert!(!market.selections["900001"].suspended());
        prop_assert!(market.selections["900002"].suspended());
        prop_assert!(!market.selections["900003"].suspended());
    }
}
