//! Reference node: the ground truth for chain identity
//!
//! Owned by the scheduler and handed to each assessment as a snapshot.
//! Refresh is best effort: a failed refresh keeps serving the last good
//! snapshot and is not retried before the backoff elapses.

use anyhow::Result;
use chrono::Utc;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{info, warn};

use super::endpoint_url;
use super::ledger::fetch_ledger_info;
use super::types::ReferenceSnapshot;
use crate::config::Config;
use crate::constants::reference::RETRY_BACKOFF;

#[derive(Debug, Default)]
struct ReferenceState {
    snapshot: Option<ReferenceSnapshot>,
    refreshed: Option<Instant>,
    last_failure: Option<Instant>,
}

pub struct ReferenceNode {
    url: String,
    client: HttpClient,
    ttl: Duration,
    retry_backoff: Duration,
    state: RwLock<ReferenceState>,
    // Serialises refreshes so concurrent workers trigger a single fetch
    refresh_lock: Mutex<()>,
}

impl ReferenceNode {
    pub fn new(config: &Config) -> Result<Self> {
        let url = endpoint_url(
            &config.reference.protocol,
            &config.reference.host,
            config.reference.api_port,
            &config.ledger_path,
        );
        let client = HttpClient::builder()
            .timeout(config.probe_timeout())
            .build()?;

        Ok(Self::with_client(
            url,
            client,
            Duration::from_secs(config.reference.refresh_interval_seconds),
        ))
    }

    pub fn with_client(url: String, client: HttpClient, ttl: Duration) -> Self {
        Self {
            url,
            client,
            ttl,
            retry_backoff: RETRY_BACKOFF,
            state: RwLock::new(ReferenceState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Last good snapshot without triggering a refresh
    pub async fn current(&self) -> Option<ReferenceSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    fn needs_refresh(&self, state: &ReferenceState, now: Instant) -> bool {
        let stale = match state.refreshed {
            Some(refreshed) => now.duration_since(refreshed) > self.ttl,
            None => true,
        };
        let backing_off = state
            .last_failure
            .map(|failure| now.duration_since(failure) < self.retry_backoff)
            .unwrap_or(false);
        stale && !backing_off
    }

    /// Refresh the snapshot if it is older than the TTL and return the
    /// snapshot to use. None only if no refresh has ever succeeded.
    pub async fn refresh_if_stale(&self) -> Option<ReferenceSnapshot> {
        {
            let state = self.state.read().await;
            if !self.needs_refresh(&state, Instant::now()) {
                return state.snapshot.clone();
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // Another worker may have refreshed while we waited
        {
            let state = self.state.read().await;
            if !self.needs_refresh(&state, Instant::now()) {
                return state.snapshot.clone();
            }
        }

        let result = fetch_ledger_info(&self.client, &self.url).await;

        let mut state = self.state.write().await;
        let now = Instant::now();
        match result {
            Ok(info) => {
                let snapshot = ReferenceSnapshot::from_ledger(info, Utc::now());
                info!(
                    "Reference node refreshed: chain {} epoch {} version {}",
                    snapshot.chain_id, snapshot.epoch, snapshot.ledger_version
                );
                state.snapshot = Some(snapshot);
                state.refreshed = Some(now);
                state.last_failure = None;
            }
            Err(e) => {
                state.last_failure = Some(now);
                if state.snapshot.is_some() {
                    warn!("Reference refresh failed, keeping last snapshot: {}", e);
                } else {
                    warn!("Reference refresh failed and no snapshot yet, chain id checks skipped: {}", e);
                }
            }
        }
        state.snapshot.clone()
    }
}
