//! Snapshot application
//!
//! Walks the decoded segments of a snapshot (or insert) payload in wire order
//! with a running event/market context, upserting entities as it goes.

use std::collections::BTreeSet;

use tracing::trace;

use crate::domain::{clean_line, clean_str, odds, Selection};
use crate::protocol::{
    contains_entity_segments, decode_segments, item_fixture, non_empty, EventFields, MarketFields, RawFields, SegmentTag,
    SelectionFields,
};

use super::correlator::MarketPointer;
use super::frame_log::{LogSummary, SegmentStats};
use super::goal::GoalSignal;
use super::state::FeedState;
use super::store::{ensure_market, normalize_market_name};

/// Running context of one payload
#[derive(Debug, Default)]
struct SnapshotContext {
    event_id: Option<String>,
    fixture: Option<String>,
    market_key: Option<String>,
    stats: SegmentStats,
    touched: BTreeSet<String>,
}

impl FeedState {
    /// Apply a snapshot payload. Segments that cannot be placed are counted
    /// and skipped; nothing here fails.
    pub(crate) fn apply_snapshot(&mut self, payload: &str, now: i64, touched: &mut BTreeSet<String>) {
        if !contains_entity_segments(payload) {
            return;
        }
        let mut ctx = SnapshotContext::default();

        for segment in decode_segments(payload) {
            let applied = match segment.tag {
                SegmentTag::Event => self.apply_event_segment(&mut ctx, &segment.fields, now),
                SegmentTag::MarketHeader => self.apply_market_header(&mut ctx, &segment.fields, now),
                SegmentTag::MarketConfig => self.apply_market_config(&mut ctx, &segment.fields, now),
                SegmentTag::Selection => self.apply_selection_segment(&mut ctx, &segment.fields, now),
                SegmentTag::Other(_) => continue,
            };

            if applied {
                self.stats.segments_applied += 1;
            } else {
                ctx.stats.ignored += 1;
                self.stats.segments_ignored += 1;
            }
        }

        for event_id in &ctx.touched {
            self.frame_log.push(
                event_id,
                now,
                LogSummary::SnapshotApplied {
                    fixture: ctx.fixture.clone(),
                    market_key: ctx.market_key.clone(),
                    stats: ctx.stats.clone(),
                },
            );
        }
        touched.extend(ctx.touched);
    }

    /// `EV`: open a new event context.
    fn apply_event_segment(&mut self, ctx: &mut SnapshotContext, fields: &RawFields, now: i64) -> bool {
        let ev = EventFields::from_fields(fields);
        ctx.market_key = None;

        let fixture = ev
            .fixture_id()
            .map(str::to_string)
            .or_else(|| non_empty(&ev.item).and_then(item_fixture));
        if fixture.is_some() {
            ctx.fixture = fixture.clone();
        }

        let event_id = non_empty(&ev.stable_id).map(str::to_string).or_else(|| {
            fixture
                .as_deref()
                .and_then(|f| self.correlator.resolve(f))
                .map(str::to_string)
        });
        let Some(event_id) = event_id else {
            ctx.event_id = None;
            trace!(fixture = ?fixture, "Event segment without resolvable id");
            return false;
        };

        let previous = self
            .store
            .event(&event_id)
            .map(|event| event.score.clone())
            .unwrap_or_default();
        let event = self.store.upsert_event(&event_id, &ev);
        let name = event.name.clone();
        let score = event.score.clone();

        if let Some(fixture) = &fixture {
            self.correlator.bind_fixture(fixture, &event_id);
            if !name.is_empty() {
                self.correlator.remember_event_name(fixture, &name);
            }
        }
        if let Some(item) = non_empty(&ev.item) {
            self.store.list_item(item, &event_id);
        }

        // A score that moves inside a snapshot is a goal too
        if !previous.is_empty() && score != previous {
            self.on_goal(&event_id, &previous, &score, GoalSignal::ScoreChange, now);
        }

        ctx.stats.events += 1;
        ctx.touched.insert(event_id.clone());
        ctx.event_id = Some(event_id);
        true
    }

    /// Current event of the context, resolving it from the fixture when the
    /// payload did not open one.
    fn context_event(&mut self, ctx: &mut SnapshotContext, segment_fixture: &Option<String>) -> Option<String> {
        if let Some(fixture) = non_empty(segment_fixture) {
            ctx.fixture = Some(fixture.to_string());
        }
        if ctx.event_id.is_none() {
            ctx.event_id = ctx
                .fixture
                .as_deref()
                .and_then(|f| self.correlator.resolve(f))
                .map(str::to_string);
        }
        if let (Some(fixture), Some(event_id)) = (&ctx.fixture, &ctx.event_id) {
            self.correlator.bind_fixture(fixture, event_id);
        }
        ctx.event_id.clone()
    }

    /// `MG`: open a new market context under the current event.
    fn apply_market_header(&mut self, ctx: &mut SnapshotContext, fields: &RawFields, now: i64) -> bool {
        let mf = MarketFields::from_fields(fields);
        let Some(event_id) = self.context_event(ctx, &mf.fixture) else {
            ctx.market_key = None;
            return false;
        };

        let name = normalize_market_name(mf.display_name());
        let market_id = mf.market_id();
        let token = non_empty(&mf.token);

        let event = self.store.ensure_event(&event_id);
        let key = ensure_market(event, &name, &name, market_id, token);
        if let Some(market) = event.markets.get_mut(&key) {
            if let Some(order) = clean_str(mf.order.as_deref()) {
                market.order = Some(order);
            }
            if let Some(style) = clean_str(mf.style.as_deref()) {
                market.style = Some(style);
            }
            market.touch(now);
        }

        if let Some(fixture) = &ctx.fixture {
            self.correlator.set_current_market(
                fixture,
                MarketPointer {
                    key: key.clone(),
                    name,
                    market_id: market_id.map(str::to_string),
                    token: token.map(str::to_string),
                },
            );
        }

        ctx.market_key = Some(key);
        ctx.stats.markets += 1;
        ctx.touched.insert(event_id);
        true
    }

    /// `MA`: enrich the current market's classification fields.
    fn apply_market_config(&mut self, ctx: &mut SnapshotContext, fields: &RawFields, now: i64) -> bool {
        let mf = MarketFields::from_fields(fields);
        if let Some(fixture) = non_empty(&mf.fixture) {
            ctx.fixture = Some(fixture.to_string());
        }
        if let Some(fixture) = &ctx.fixture {
            self.correlator
                .refresh_market_meta(fixture, non_empty(&mf.id), non_empty(&mf.token));
        }

        let (Some(event_id), Some(market_key)) = (&ctx.event_id, &ctx.market_key) else {
            return false;
        };
        let Some(market) = self
            .store
            .event_mut(event_id)
            .and_then(|event| event.markets.get_mut(market_key))
        else {
            return false;
        };

        if let Some(layout) = clean_str(mf.layout.as_deref()) {
            market.layout = Some(layout);
        }
        if let Some(columns) = clean_str(mf.columns.as_deref()) {
            market.columns = Some(columns);
        }
        if let Some(style) = clean_str(mf.style.as_deref()) {
            market.style = Some(style);
        }
        market.touch(now);
        true
    }

    /// `PA`: upsert a selection under the current market.
    fn apply_selection_segment(&mut self, ctx: &mut SnapshotContext, fields: &RawFields, now: i64) -> bool {
        let sf = SelectionFields::from_fields(fields);
        let Some(event_id) = self.context_event(ctx, &sf.fixture) else {
            return false;
        };

        // No MG in this payload: fall back to the fixture's last known market.
        if ctx.market_key.is_none() {
            let pointer = ctx
                .fixture
                .as_deref()
                .and_then(|f| self.correlator.current_market(f))
                .cloned();
            if let Some(pointer) = pointer {
                let event = self.store.ensure_event(&event_id);
                ctx.market_key = Some(ensure_market(
                    event,
                    &pointer.key,
                    &pointer.name,
                    pointer.market_id.as_deref(),
                    pointer.token.as_deref(),
                ));
            }
        }
        let Some(market_key) = ctx.market_key.clone() else {
            return false;
        };

        let mut candidate = Selection::new();
        candidate.id = clean_str(sf.id.as_deref());
        candidate.token = clean_str(sf.token.as_deref());
        candidate.name = clean_str(sf.name.as_deref());
        candidate.odds = clean_str(sf.odds.as_deref());
        candidate.line_ha = clean_line(sf.line_ha.as_deref());
        candidate.line_hd = clean_line(sf.line_hd.as_deref());
        candidate.order = clean_str(sf.order.as_deref());
        candidate.category = clean_str(sf.category.as_deref());

        if candidate.is_empty() {
            return false;
        }

        let event = self.store.ensure_event(&event_id);
        let Some(market) = event.markets.get_mut(&market_key) else {
            return false;
        };
        market.touch(now);

        let unpriced = odds::is_unpriced(candidate.odds.as_deref());
        if let Some(name) = &candidate.name {
            if unpriced && market.line.is_none() && name.chars().any(|c| c.is_ascii_digit()) {
                market.line = Some(name.clone());
            }
        }
        if candidate.is_placeholder() {
            ctx.touched.insert(event_id);
            return true;
        }

        let key = candidate
            .id
            .clone()
            .or_else(|| candidate.token.clone())
            .unwrap_or_else(|| {
                format!(
                    "{}|{}|{}",
                    candidate.name.as_deref().unwrap_or_default(),
                    candidate.line_ha.as_deref().unwrap_or_default(),
                    candidate.line_hd.as_deref().unwrap_or_default()
                )
            });

        let selection = market.selections.entry(key).or_default();
        merge_snapshot_selection(selection, candidate);
        selection.apply_suspension_signal(sf.suspension_signal());
        selection.touch(now);

        if let Some(id) = &selection.id {
            self.correlator.bind_selection(id, &event_id);
        }

        ctx.stats.selections += 1;
        ctx.stats.upserts += 1;
        ctx.touched.insert(event_id);
        true
    }
}

/// Non-empty candidate values replace stored ones; odds changes recompute the
/// decimal value. Suspension is handled by the caller.
fn merge_snapshot_selection(selection: &mut Selection, candidate: Selection) {
    fn set(target: &mut Option<String>, value: Option<String>) {
        if value.is_some() {
            *target = value;
        }
    }

    if let Some(odds) = candidate.odds {
        if selection.odds.as_deref() != Some(odds.as_str()) || selection.odds_decimal.is_none() {
            selection.set_odds(odds);
        }
    }
    set(&mut selection.id, candidate.id);
    set(&mut selection.token, candidate.token);
    set(&mut selection.name, candidate.name);
    set(&mut selection.line_ha, candidate.line_ha);
    set(&mut selection.line_hd, candidate.line_hd);
    set(&mut selection.order, candidate.order);
    set(&mut selection.category, candidate.category);
}
