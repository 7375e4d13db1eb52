//! Health assessment module
//!
//! This module derives a node's health verdict from raw network probes:
//! TCP reachability of its ports, ledger info from its API, and state sync
//! counters from its metrics endpoint, compared against a reference node.

pub mod assessor;
mod ledger;
pub mod metrics;
pub mod probe;
pub mod reference;
pub mod types;

pub use assessor::{AssessorSettings, NodeHealthAssessor};
pub use ledger::fetch_ledger_info;
pub use probe::probe_port;
pub use reference::ReferenceNode;
pub use types::{HealthAssessment, LedgerInfo, ReferenceSnapshot};

/// Build `{protocol}://{host}:{port}{path}`, bracketing IPv6 literals.
pub fn endpoint_url(protocol: &str, host: &str, port: u16, path: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("{}://[{}]:{}{}", protocol, host, port, path)
    } else {
        format!("{}://{}:{}{}", protocol, host, port, path)
    }
}
