pub mod manager;
use serde::{Deserialize, Serialize};
use std::time::Duration;
pub use manager::ConfigManager;

use crate::constants::defaults;
use crate::errors::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    // Empty string disables delivery; alerts are then only logged
    #[serde(default)]
    pub alarm_webhook_url: String,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    #[serde(default = "default_update_frequency")]
    pub update_frequency_seconds: u64,
    #[serde(default = "default_max_check_age")]
    pub max_check_age_seconds: u64,
    #[serde(default = "default_alert_interval")]
    pub alert_interval_seconds: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    #[serde(default = "default_out_of_sync_threshold")]
    pub out_of_sync_threshold: u64,
    #[serde(default = "default_node_protocol")]
    pub node_protocol: String,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    #[serde(default)]
    pub reference: ReferenceConfig,
}

/// Connection settings for the ground-truth node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_reference_protocol")]
    pub protocol: String,
    #[serde(default = "default_reference_port")]
    pub api_port: u16,
    #[serde(default = "default_reference_refresh")]
    pub refresh_interval_seconds: u64,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_database_path() -> String {
    defaults::DATABASE_PATH.to_string()
}

fn default_worker_threads() -> usize {
    defaults::WORKER_THREADS
}

fn default_update_frequency() -> u64 {
    defaults::UPDATE_FREQUENCY_SECONDS
}

fn default_max_check_age() -> u64 {
    defaults::MAX_CHECK_AGE_SECONDS
}

fn default_alert_interval() -> u64 {
    defaults::ALERT_INTERVAL_SECONDS
}

fn default_probe_timeout() -> u64 {
    defaults::PROBE_TIMEOUT_SECONDS
}

fn default_out_of_sync_threshold() -> u64 {
    defaults::OUT_OF_SYNC_THRESHOLD
}

fn default_node_protocol() -> String {
    defaults::NODE_PROTOCOL.to_string()
}

fn default_ledger_path() -> String {
    defaults::LEDGER_PATH.to_string()
}

fn default_metrics_path() -> String {
    defaults::METRICS_PATH.to_string()
}

fn default_reference_protocol() -> String {
    defaults::REFERENCE_PROTOCOL.to_string()
}

fn default_reference_port() -> u16 {
    defaults::REFERENCE_API_PORT
}

fn default_reference_refresh() -> u64 {
    defaults::REFERENCE_REFRESH_SECONDS
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            protocol: default_reference_protocol(),
            api_port: default_reference_port(),
            refresh_interval_seconds: default_reference_refresh(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            alarm_webhook_url: String::new(),
            worker_threads: default_worker_threads(),
            update_frequency_seconds: default_update_frequency(),
            max_check_age_seconds: default_max_check_age(),
            alert_interval_seconds: default_alert_interval(),
            probe_timeout_seconds: default_probe_timeout(),
            out_of_sync_threshold: default_out_of_sync_threshold(),
            node_protocol: default_node_protocol(),
            ledger_path: default_ledger_path(),
            metrics_path: default_metrics_path(),
            reference: ReferenceConfig::default(),
        }
    }
}

impl Config {
    pub fn update_frequency(&self) -> Duration {
        Duration::from_secs(self.update_frequency_seconds)
    }

    pub fn max_check_age(&self) -> Duration {
        Duration::from_secs(self.max_check_age_seconds)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.worker_threads == 0 {
            return Err(invalid("worker_threads", "must be at least 1"));
        }
        if self.update_frequency_seconds == 0 {
            return Err(invalid("update_frequency_seconds", "must be greater than 0"));
        }
        if self.alert_interval_seconds == 0 {
            return Err(invalid("alert_interval_seconds", "must be greater than 0"));
        }
        if self.probe_timeout_seconds == 0 {
            return Err(invalid("probe_timeout_seconds", "must be greater than 0"));
        }
        if self.reference.host.trim().is_empty() {
            return Err(invalid("reference.host", "reference node host is required"));
        }
        if self.reference.refresh_interval_seconds == 0 {
            return Err(invalid(
                "reference.refresh_interval_seconds",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
