use anyhow::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::cycle_interval;
use crate::config::Config;
use crate::constants::alerts::HEARTBEAT_EVERY_CYCLES;
use crate::database::{now_millis, Database, NodeKey, NodeRecord};
use crate::health::{NodeHealthAssessor, ReferenceNode};

type InFlightSet = Arc<Mutex<HashSet<NodeKey>>>;

/// Marks a record as being checked; released when the worker finishes,
/// including when it panics.
struct InFlightSlot {
    key: NodeKey,
    set: InFlightSet,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

pub struct CheckScheduler {
    database: Arc<Database>,
    assessor: Arc<NodeHealthAssessor>,
    reference: Arc<ReferenceNode>,
    workers: Arc<Semaphore>,
    worker_threads: usize,
    in_flight: InFlightSet,
    update_frequency: Duration,
    max_check_age: Duration,
}

impl CheckScheduler {
    pub fn new(
        config: &Config,
        database: Arc<Database>,
        assessor: Arc<NodeHealthAssessor>,
        reference: Arc<ReferenceNode>,
    ) -> Self {
        Self::with_timing(
            database,
            assessor,
            reference,
            config.worker_threads,
            config.update_frequency(),
            config.max_check_age(),
        )
    }

    pub fn with_timing(
        database: Arc<Database>,
        assessor: Arc<NodeHealthAssessor>,
        reference: Arc<ReferenceNode>,
        worker_threads: usize,
        update_frequency: Duration,
        max_check_age: Duration,
    ) -> Self {
        let worker_threads = worker_threads.max(1);
        Self {
            database,
            assessor,
            reference,
            workers: Arc::new(Semaphore::new(worker_threads)),
            worker_threads,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            update_frequency,
            max_check_age,
        }
    }

    /// Number of records currently being checked
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Workers currently running a check; never exceeds the pool size
    pub fn busy_workers(&self) -> usize {
        self.worker_threads
            .saturating_sub(self.workers.available_permits())
    }

    /// Run the scheduling loop forever.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Health-check scheduler started: every {:?}, records stale after {:?}",
            self.update_frequency, self.max_check_age
        );

        let mut interval = cycle_interval(self.update_frequency);
        let mut cycle = 0u64;

        loop {
            interval.tick().await;
            cycle += 1;

            if cycle.is_multiple_of(HEARTBEAT_EVERY_CYCLES) {
                info!(
                    "Health-check cycle #{} - {} checks in flight, {}/{} workers busy",
                    cycle,
                    self.in_flight_count(),
                    self.busy_workers(),
                    self.worker_threads
                );
            }

            if let Err(e) = self.run_cycle().await {
                warn!("Health-check cycle #{} failed: {}", cycle, e);
            }
        }
    }

    /// Submit every due record to the worker pool.
    ///
    /// Returns the handles of the submitted checks; the loop does not wait
    /// for them, tests do.
    #[instrument(skip(self))]
    pub async fn run_cycle(self: &Arc<Self>) -> Result<Vec<JoinHandle<()>>> {
        let max_age = chrono::Duration::from_std(self.max_check_age)?;
        let threshold = now_millis() - max_age;
        let due = self.database.get_stale_nodes(threshold).await?;

        if due.is_empty() {
            return Ok(Vec::new());
        }
        debug!("{} records due for a health check", due.len());

        let mut handles = Vec::with_capacity(due.len());
        let mut skipped = 0usize;

        for record in due {
            let Some(slot) = self.claim(record.key()) else {
                skipped += 1;
                continue;
            };

            // Blocks while every worker is busy
            let permit = self.workers.clone().acquire_owned().await?;
            let scheduler = Arc::clone(self);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let _slot = slot;
                let key = record.key();
                if let Err(e) = scheduler.check_node(record).await {
                    error!("Health check of {} failed: {}", key, e);
                }
            }));
        }

        if skipped > 0 {
            debug!("Skipped {} records still being checked", skipped);
        }
        Ok(handles)
    }

    fn claim(&self, key: NodeKey) -> Option<InFlightSlot> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(key.clone()) {
            return None;
        }
        Some(InFlightSlot {
            key,
            set: Arc::clone(&self.in_flight),
        })
    }

    /// Assess one record and persist the outcome.
    pub async fn check_node(&self, mut record: NodeRecord) -> Result<NodeRecord> {
        let reference = self.reference.refresh_if_stale().await;
        let assessment = self.assessor.assess(&record, reference.as_ref()).await;

        let previous = record.status;
        let changed = record.apply_assessment(assessment.errors, now_millis());

        if !self.database.store_check_result(&record).await? {
            debug!("{} was deleted during its check, result dropped", record.key());
            return Ok(record);
        }

        if changed {
            info!(
                "{} changed: {} -> {} {:?}",
                record.key(),
                previous,
                record.status,
                record.errors
            );
        }
        Ok(record)
    }
}
