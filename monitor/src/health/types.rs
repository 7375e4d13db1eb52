//! Health assessment types and node API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::database::NodeStatus;

/// Ledger info as served by the node API index endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    #[serde(deserialize_with = "number_or_string")]
    pub chain_id: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub epoch: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub ledger_version: u64,
    // Microseconds since the unix epoch
    #[serde(deserialize_with = "number_or_string")]
    pub ledger_timestamp: u64,
}

/// The API serialises u64 counters as JSON strings but small ids as numbers.
fn number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Last good view of the canonical chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSnapshot {
    pub chain_id: u64,
    pub epoch: u64,
    pub ledger_version: u64,
    pub ledger_timestamp: u64,
    pub refreshed_at: DateTime<Utc>,
}

impl ReferenceSnapshot {
    pub fn from_ledger(info: LedgerInfo, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            chain_id: info.chain_id,
            epoch: info.epoch,
            ledger_version: info.ledger_version,
            ledger_timestamp: info.ledger_timestamp,
            refreshed_at,
        }
    }
}

/// Verdict for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthAssessment {
    pub status: NodeStatus,
    /// Lexicographically sorted, no duplicates
    pub errors: Vec<String>,
    pub ledger: Option<LedgerInfo>,
    /// None when sync could not be determined
    pub synced: Option<bool>,
}
