//! View Layer
//!
//! Read-only projections of the engine state for consumers.

pub mod aggregator;
pub mod clock;
pub mod naming;
pub mod next_goal;

pub use aggregator::{build_event_view, build_market_view, markets_by_name, EventView, MarketView, SelectionView};
pub use clock::{match_time, period, Period};
pub use naming::{parse_home_away, synthesize_name, NamingInput};
pub use next_goal::{ordinal, resolve_next_goal, total_goals, NextGoalReason, NextGoalView};
