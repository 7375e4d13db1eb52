//! Common test data and constants

use chrono::{DateTime, Utc};
use fake::faker::internet::en::IPv4;
use fake::Fake;
use std::net::TcpListener;
use std::time::Duration;

use monitor::database::{NodeRecord, NodeStatus};
use monitor::health::{AssessorSettings, LedgerInfo, ReferenceSnapshot};

/// Chain id the reference node reports in tests
pub const MAINNET_CHAIN_ID: u64 = 1;
pub const TESTNET_CHAIN_ID: u64 = 2;

/// Chat-style numeric owner id
pub fn random_owner() -> String {
    (100_000_000u64..999_999_999u64).fake::<u64>().to_string()
}

pub fn random_address() -> String {
    IPv4().fake()
}

/// A port nothing listens on: bind to port 0 and release it
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}

/// Listener that keeps a port open for the lifetime of the test
pub fn open_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    (listener, port)
}

pub fn reference_snapshot(chain_id: u64) -> ReferenceSnapshot {
    ReferenceSnapshot::from_ledger(
        LedgerInfo {
            chain_id,
            epoch: 5421,
            ledger_version: 1_183_529_871,
            ledger_timestamp: 1_719_930_032_412_853,
        },
        Utc::now(),
    )
}

pub fn test_settings() -> AssessorSettings {
    AssessorSettings {
        protocol: "http".to_string(),
        ledger_path: "/v1".to_string(),
        metrics_path: "/metrics".to_string(),
        probe_timeout: Duration::from_secs(2),
        out_of_sync_threshold: 5000,
    }
}

pub fn errors(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Unhealthy record as the scheduler would have stored it at `modified`
pub fn failing_record(
    owner_id: &str,
    address: &str,
    failures: &[&str],
    modified: DateTime<Utc>,
) -> NodeRecord {
    let mut record = NodeRecord::new(owner_id, address, Some(8080), Some(9101), Some(6180));
    record.status = NodeStatus::Unhealthy;
    record.errors = errors(failures);
    record.last_checked = Some(modified);
    record.last_modified = Some(modified);
    record
}
