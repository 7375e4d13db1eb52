//! Health-check scheduling
//!
//! Every `update_frequency` the scheduler selects the records whose last
//! check is older than `max_check_age` and submits each one to a bounded
//! worker pool. Submission blocks while the pool is saturated, so no due
//! record is ever dropped; a record whose previous check is still running
//! is skipped until the next cycle.
//!
//! The scheduler only talks to the alert loop through the database.

pub mod checks;
pub use checks::CheckScheduler;

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Ticker for a periodic loop. The first tick completes immediately; a cycle
/// that overruns pushes the next tick back instead of firing catch-up ticks.
pub fn cycle_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
