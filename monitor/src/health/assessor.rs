//! Node health assessment
//!
//! One assessment probes the three node ports concurrently, then fetches
//! ledger info and sync metrics from the ports that are configured and open.
//! Every failure becomes a literal entry in the error list; the status is
//! derived from whether that list is empty.

use anyhow::Result;
use futures::future::join3;
use reqwest::Client as HttpClient;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, instrument};

use super::endpoint_url;
use super::ledger::fetch_ledger_info;
use super::metrics::fetch_sync_state;
use super::probe::probe_port;
use super::types::{HealthAssessment, LedgerInfo, ReferenceSnapshot};
use crate::config::Config;
use crate::constants::health_errors;
use crate::database::{NodeRecord, NodeStatus};

#[derive(Debug, Clone)]
pub struct AssessorSettings {
    pub protocol: String,
    pub ledger_path: String,
    pub metrics_path: String,
    pub probe_timeout: Duration,
    pub out_of_sync_threshold: u64,
}

impl AssessorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            protocol: config.node_protocol.clone(),
            ledger_path: config.ledger_path.clone(),
            metrics_path: config.metrics_path.clone(),
            probe_timeout: config.probe_timeout(),
            out_of_sync_threshold: config.out_of_sync_threshold,
        }
    }
}

pub struct NodeHealthAssessor {
    client: HttpClient,
    settings: AssessorSettings,
}

impl NodeHealthAssessor {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_settings(AssessorSettings::from_config(config))
    }

    pub fn with_settings(settings: AssessorSettings) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(settings.probe_timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &AssessorSettings {
        &self.settings
    }

    /// Assess one node. Never fails: every problem ends up in the error list.
    ///
    /// Without a reference snapshot the chain id comparison is skipped.
    #[instrument(skip(self, record, reference), fields(node = %record.key()))]
    pub async fn assess(
        &self,
        record: &NodeRecord,
        reference: Option<&ReferenceSnapshot>,
    ) -> HealthAssessment {
        let timeout = self.settings.probe_timeout;
        let host = record.address.as_str();

        let (api_open, metrics_open, seed_open) = join3(
            probe_port(host, record.api_port, timeout),
            probe_port(host, record.metrics_port, timeout),
            probe_port(host, record.seed_port, timeout),
        )
        .await;

        let mut errors = BTreeSet::new();
        if !api_open {
            errors.insert(health_errors::API_PORT_CLOSED.to_string());
        }
        if !metrics_open {
            errors.insert(health_errors::METRICS_PORT_CLOSED.to_string());
        }
        if !seed_open {
            errors.insert(health_errors::SEED_PORT_CLOSED.to_string());
        }

        let mut ledger = None;
        if let (Some(port), true) = (record.api_port, api_open) {
            ledger = self.check_ledger(host, port, reference, &mut errors).await;
        }

        let mut synced = None;
        if let (Some(port), true) = (record.metrics_port, metrics_open) {
            synced = self.check_sync(host, port, &mut errors).await;
        }

        let errors: Vec<String> = errors.into_iter().collect();
        let status = NodeStatus::from_errors(&errors);
        debug!("Assessed {} as {} ({} errors)", record.key(), status, errors.len());

        HealthAssessment {
            status,
            errors,
            ledger,
            synced,
        }
    }

    async fn check_ledger(
        &self,
        host: &str,
        port: u16,
        reference: Option<&ReferenceSnapshot>,
        errors: &mut BTreeSet<String>,
    ) -> Option<LedgerInfo> {
        let url = endpoint_url(&self.settings.protocol, host, port, &self.settings.ledger_path);
        match fetch_ledger_info(&self.client, &url).await {
            Ok(info) => {
                if let Some(reference) = reference {
                    if info.chain_id != reference.chain_id {
                        debug!(
                            "{} reports chain {}, reference is on chain {}",
                            url, info.chain_id, reference.chain_id
                        );
                        errors.insert(health_errors::NODE_OUT_OF_DATE.to_string());
                    }
                }
                Some(info)
            }
            Err(e) => {
                debug!("Ledger fetch failed: {}", e);
                errors.insert(format!(
                    "{}: {}",
                    health_errors::API_DEGRADED_PREFIX,
                    e.summary()
                ));
                None
            }
        }
    }

    async fn check_sync(
        &self,
        host: &str,
        port: u16,
        errors: &mut BTreeSet<String>,
    ) -> Option<bool> {
        let url = endpoint_url(&self.settings.protocol, host, port, &self.settings.metrics_path);
        match fetch_sync_state(&self.client, &url, self.settings.out_of_sync_threshold).await {
            Ok(Some(false)) => {
                errors.insert(health_errors::OUT_OF_SYNC.to_string());
                Some(false)
            }
            Ok(state) => state,
            Err(e) => {
                debug!("Metrics fetch failed: {}", e);
                errors.insert(format!(
                    "{}: {}",
                    health_errors::METRICS_DEGRADED_PREFIX,
                    e.summary()
                ));
                None
            }
        }
    }
}
