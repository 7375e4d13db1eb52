//! Alert aggregation loop
//!
//! Each cycle reads the failing records, keeps the alert-eligible ones,
//! sends one message per owner and stamps `last_alarm_sent` on every record
//! it reported. Eligibility is re-derived from timestamps each cycle.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::notifier::Notifier;
use crate::constants::alerts::{ALERT_HEADER, HEARTBEAT_EVERY_CYCLES};
use crate::database::{now_millis, Database, NodeRecord};
use crate::scheduler::cycle_interval;

/// Outcome of one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertCycleReport {
    pub owners_alerted: usize,
    pub nodes_reported: usize,
    /// Records changed by a check between read and stamp; alerted again next cycle
    pub stamps_skipped: usize,
}

pub struct AlertAggregator {
    database: Arc<Database>,
    notifier: Arc<Notifier>,
    interval: Duration,
}

impl AlertAggregator {
    pub fn new(database: Arc<Database>, notifier: Arc<Notifier>, interval: Duration) -> Self {
        Self {
            database,
            notifier,
            interval,
        }
    }

    pub async fn run(self: Arc<Self>) {
        info!(
            "Alert aggregator started: every {:?}, delivery enabled: {}",
            self.interval,
            self.notifier.is_enabled()
        );

        let mut interval = cycle_interval(self.interval);
        let mut cycle = 0u64;

        loop {
            interval.tick().await;
            cycle += 1;

            match self.run_cycle().await {
                Ok(report) => {
                    if cycle.is_multiple_of(HEARTBEAT_EVERY_CYCLES) {
                        info!("Alert cycle #{}: {:?}", cycle, report);
                    }
                }
                Err(e) => warn!("Alert cycle #{} failed: {}", cycle, e),
            }
        }
    }

    pub async fn run_cycle(&self) -> Result<AlertCycleReport> {
        let unhealthy = self.database.get_unhealthy_nodes().await?;
        let groups = group_eligible_by_owner(unhealthy);

        let mut report = AlertCycleReport::default();
        for (owner_id, records) in groups {
            let text = compose_alert(&records);
            self.notifier.send(&owner_id, &text).await;

            let sent_at = now_millis();
            for record in &records {
                if self.database.mark_alarm_sent(record, sent_at).await? {
                    report.nodes_reported += 1;
                } else {
                    debug!(
                        "{} changed while alerting, stays eligible",
                        record.key()
                    );
                    report.stamps_skipped += 1;
                }
            }
            report.owners_alerted += 1;
        }

        if report.owners_alerted > 0 {
            info!(
                "Alerted {} owners about {} nodes",
                report.owners_alerted, report.nodes_reported
            );
        }
        Ok(report)
    }
}

/// Alert-eligible records grouped by owner, owners and addresses in order.
pub fn group_eligible_by_owner(records: Vec<NodeRecord>) -> BTreeMap<String, Vec<NodeRecord>> {
    let mut groups: BTreeMap<String, Vec<NodeRecord>> = BTreeMap::new();
    for record in records.into_iter().filter(NodeRecord::is_alert_eligible) {
        groups.entry(record.owner_id.clone()).or_default().push(record);
    }
    for records in groups.values_mut() {
        records.sort_by(|a, b| a.address.cmp(&b.address));
    }
    groups
}

pub fn compose_alert(records: &[NodeRecord]) -> String {
    let mut text = String::from(ALERT_HEADER);
    for record in records {
        text.push_str("\n\n");
        text.push_str(&record.address);
        for error in &record.errors {
            text.push_str("\n- ");
            text.push_str(error);
        }
    }
    text
}
