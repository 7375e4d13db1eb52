//! Database record types (entities).
//!
//! `NodeRecord` is the only persisted entity. It doubles as the unit of work
//! for the health-check scheduler and the alert aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tri-state health of a monitored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Registered but never assessed
    Unknown,
    Healthy,
    Unhealthy,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Unknown => "unknown",
            NodeStatus::Healthy => "healthy",
            NodeStatus::Unhealthy => "unhealthy",
        }
    }

    /// Status implied by an assessment's error list
    pub fn from_errors(errors: &[String]) -> Self {
        if errors.is_empty() {
            NodeStatus::Healthy
        } else {
            NodeStatus::Unhealthy
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(NodeStatus::Unknown),
            "healthy" => Ok(NodeStatus::Healthy),
            "unhealthy" => Ok(NodeStatus::Unhealthy),
            other => Err(anyhow::anyhow!("Unknown node status '{}'", other)),
        }
    }
}

/// Natural key of a node record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub owner_id: String,
    pub address: String,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub owner_id: String,
    pub address: String,
    // None means the dimension is not checked and counts as healthy
    pub api_port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub seed_port: Option<u16>,
    pub status: NodeStatus,
    /// Sorted, deduplicated failure reasons; empty iff status is healthy
    pub errors: Vec<String>,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_alarm_sent: Option<DateTime<Utc>>,
}

impl NodeRecord {
    /// Fresh record as created by operator registration
    pub fn new(
        owner_id: impl Into<String>,
        address: impl Into<String>,
        api_port: Option<u16>,
        metrics_port: Option<u16>,
        seed_port: Option<u16>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            address: address.into(),
            api_port,
            metrics_port,
            seed_port,
            status: NodeStatus::Unknown,
            errors: Vec::new(),
            last_checked: None,
            last_modified: None,
            last_alarm_sent: None,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            owner_id: self.owner_id.clone(),
            address: self.address.clone(),
        }
    }

    /// Failing and not yet notified since the failure last changed.
    ///
    /// Derived from timestamps every time so that the dedup rule survives
    /// restarts without any extra state.
    pub fn is_alert_eligible(&self) -> bool {
        if self.status != NodeStatus::Unhealthy {
            return false;
        }
        match (self.last_alarm_sent, self.last_modified) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(sent), Some(modified)) => sent < modified,
        }
    }

    /// Fold an assessment outcome into the record.
    ///
    /// `last_checked` always advances; `last_modified` only advances when the
    /// status or the error list differ from what was stored. Returns whether
    /// the record changed.
    pub fn apply_assessment(&mut self, errors: Vec<String>, now: DateTime<Utc>) -> bool {
        let status = NodeStatus::from_errors(&errors);
        let changed = self.status == NodeStatus::Unknown
            || self.status != status
            || self.errors != errors;

        self.status = status;
        self.errors = errors;
        self.last_checked = Some(now);
        if changed {
            self.last_modified = Some(now);
        }
        changed
    }

    /// One line per reportable fact, as shown to the owner
    pub fn summary_lines(&self) -> Vec<String> {
        match self.status {
            NodeStatus::Unknown => vec![format!("{} - Unknown status", self.address)],
            NodeStatus::Healthy => vec![format!("{} - Running", self.address)],
            NodeStatus::Unhealthy => self
                .errors
                .iter()
                .map(|error| format!("{} - Error: {}", self.address, error))
                .collect(),
        }
    }
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary_lines().join("\n"))
    }
}

/// Node counts per status, for the status endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub total: i64,
    pub healthy: i64,
    pub unhealthy: i64,
    pub unknown: i64,
}
