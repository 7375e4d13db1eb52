//! HTTP front end for operator commands and read-only status
//!
//! - `server` - Router construction and startup
//! - `handlers` - Request handlers grouped by concern

pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::commands::CommandHandler;
use crate::config::Config;
use crate::database::{Database, NodeCounts, NodeRecord, NodeStatus};
use crate::health::{ReferenceNode, ReferenceSnapshot};
use crate::services::Notifier;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<Database>,
    pub command_handler: Arc<CommandHandler>,
    pub reference: Arc<ReferenceNode>,
    pub notifier: Arc<Notifier>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        database: Arc<Database>,
        reference: Arc<ReferenceNode>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            command_handler: Arc::new(CommandHandler::new(database.clone())),
            config,
            database,
            reference,
            notifier,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub owner_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub reply: String,
}

/// One node as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub address: String,
    pub api_port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub seed_port: Option<u16>,
    pub status: NodeStatus,
    pub errors: Vec<String>,
    pub summary: Vec<String>,
    pub last_checked: Option<String>,
    pub last_modified: Option<String>,
    pub last_alarm_sent: Option<String>,
}

impl From<&NodeRecord> for NodeSummary {
    fn from(record: &NodeRecord) -> Self {
        Self {
            address: record.address.clone(),
            api_port: record.api_port,
            metrics_port: record.metrics_port,
            seed_port: record.seed_port,
            status: record.status,
            errors: record.errors.clone(),
            summary: record.summary_lines(),
            last_checked: record.last_checked.map(|t| t.to_rfc3339()),
            last_modified: record.last_modified.map(|t| t.to_rfc3339()),
            last_alarm_sent: record.last_alarm_sent.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub nodes: NodeCounts,
    pub alerts_enabled: bool,
    pub reference: Option<ReferenceSnapshot>,
}
