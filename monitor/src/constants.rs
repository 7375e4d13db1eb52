//! Application-wide constants for timeouts, thresholds, and user-facing text
//!
//! This module organizes constants by category so defaults and literal
//! strings that end up in persisted records live in one place.

use std::time::Duration;

/// Default configuration values
pub mod defaults {
    /// Default bind address for the command API
    pub const HOST: &str = "0.0.0.0";

    /// Default port for the command API
    pub const PORT: u16 = 8095;

    /// Default SQLite database path
    pub const DATABASE_PATH: &str = "data/nodes.db";

    /// Default size of the assessment worker pool
    pub const WORKER_THREADS: usize = 8;

    /// Seconds between health-check scheduler cycles
    pub const UPDATE_FREQUENCY_SECONDS: u64 = 10;

    /// A record is due for re-check once its last check is older than this (6 minutes)
    pub const MAX_CHECK_AGE_SECONDS: u64 = 360;

    /// Seconds between alert aggregation cycles
    pub const ALERT_INTERVAL_SECONDS: u64 = 5;

    /// Per-call timeout for TCP probes and HTTP fetches
    pub const PROBE_TIMEOUT_SECONDS: u64 = 5;

    /// Maximum tolerated gap between synced and applied versions
    pub const OUT_OF_SYNC_THRESHOLD: u64 = 5000;

    /// Protocol used to talk to monitored nodes
    pub const NODE_PROTOCOL: &str = "http";

    /// Path of the ledger info endpoint on the node API
    pub const LEDGER_PATH: &str = "/v1";

    /// Path of the Prometheus metrics endpoint
    pub const METRICS_PATH: &str = "/metrics";

    /// Reference node protocol
    pub const REFERENCE_PROTOCOL: &str = "https";

    /// Reference node API port
    pub const REFERENCE_API_PORT: u16 = 443;

    /// Reference snapshot TTL (1 hour)
    pub const REFERENCE_REFRESH_SECONDS: u64 = 3600;
}

/// Reference node refresh behaviour
pub mod reference {
    use super::Duration;

    /// Minimum delay before retrying after a failed refresh
    pub const RETRY_BACKOFF: Duration = Duration::from_secs(60);
}

/// Alert delivery constants
pub mod alerts {
    /// Webhook request timeout
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;

    /// First line of every alert message
    pub const ALERT_HEADER: &str = "🔴 Node alert";

    /// Log a loop heartbeat every N cycles
    pub const HEARTBEAT_EVERY_CYCLES: u64 = 10;
}

/// Literal error entries stored on node records.
///
/// These strings are compared against the previous assessment to decide
/// whether a record changed, so they must never embed volatile detail.
pub mod health_errors {
    pub const API_PORT_CLOSED: &str = "API port: closed";
    pub const METRICS_PORT_CLOSED: &str = "Metrics port: closed";
    pub const SEED_PORT_CLOSED: &str = "Seed port: closed";
    pub const NODE_OUT_OF_DATE: &str = "Node out of date";
    pub const OUT_OF_SYNC: &str = "Out of sync";
    pub const API_DEGRADED_PREFIX: &str = "API degraded";
    pub const METRICS_DEGRADED_PREFIX: &str = "Metrics degraded";
}

/// State sync metric series
pub mod sync_metrics {
    /// Metric family carrying state sync versions
    pub const FAMILY: &str = "aptos_state_sync_version";

    /// Label distinguishing the series inside the family
    pub const DISCRIMINATOR_LABEL: &str = "type";

    pub const SYNCED: &str = "synced";
    pub const APPLIED_TRANSACTION_OUTPUTS: &str = "applied_transaction_outputs";
}

/// Operator command syntax
pub mod commands {
    /// Port argument meaning "do not check this port"
    pub const SKIP_PORT: &str = "-";

    /// Arguments taken by `/add`: address and three ports
    pub const ADD_ARITY: usize = 4;
}

/// Replies sent back through the command surface
pub mod replies {
    pub const GREETING: &str = "Node monitor ready to watch your nodes!";
    pub const ADD_USAGE: &str =
        "❌ Valid input: /add <ip-address> <API port> <Met port> <SEED port>";
    pub const DEL_USAGE: &str = "❌ Valid input: /del <ip-address>";
    pub const NODE_ADDED: &str = "✅ Node added successfully";
    pub const NODE_DELETED: &str = "✅ Successfully deleted node";
    pub const NODE_NOT_FOUND: &str = "❌ No such node";
    pub const NO_NODES: &str = "❌ No nodes available";
    pub const UNKNOWN_COMMAND: &str = "❓ Unknown command, try /help";

    pub const HELP_LINES: [&str; 5] = [
        "/start - Start bot",
        "/help - Get bot commands",
        "/add <ip-address> <API port> <Met port> <SEED port> - Add your node to list (use - to skip a port)",
        "/del <ip-address> - Delete node from list",
        "/nodes - Get node status",
    ];
}
