//! Alerting services: delivery sink and the aggregation loop that feeds it

pub mod alert_aggregator;
pub mod notifier;

pub use alert_aggregator::{compose_alert, group_eligible_by_owner, AlertAggregator, AlertCycleReport};
pub use notifier::{AlertPayload, Notifier};
