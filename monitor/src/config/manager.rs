use super::Config;
use anyhow::Result;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// Environment variables that override `main.toml`. Credentials and
/// deployment-specific endpoints are expected to come from here.
pub const ENV_WEBHOOK_URL: &str = "MONITOR_WEBHOOK_URL";
pub const ENV_DATABASE_PATH: &str = "MONITOR_DATABASE_PATH";
pub const ENV_THREADS: &str = "MONITOR_THREADS";
pub const ENV_REFERENCE_HOST: &str = "MONITOR_REFERENCE_HOST";
pub const ENV_REFERENCE_PROTOCOL: &str = "MONITOR_REFERENCE_PROTOCOL";
pub const ENV_REFERENCE_PORT: &str = "MONITOR_REFERENCE_PORT";

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let mut config = Self::load_configuration(&config_dir).await?;
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        info!(
            "Configuration loaded: {} worker threads, check every {}s (stale after {}s), alerts every {}s, reference {}://{}:{}",
            config.worker_threads,
            config.update_frequency_seconds,
            config.max_check_age_seconds,
            config.alert_interval_seconds,
            config.reference.protocol,
            config.reference.host,
            config.reference.api_port
        );

        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);

        if !Path::new(&main_config_path).exists() {
            warn!(
                "Config file {} not found, using defaults and environment",
                main_config_path
            );
            return Ok(Config::default());
        }

        let main_config_content = fs::read_to_string(&main_config_path).await.map_err(|e| {
            ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        let config: Config = toml::from_str(&main_config_content).map_err(|e| {
            ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!("Parsed {}", main_config_path);
        Ok(config)
    }

    /// Apply `MONITOR_*` environment overrides on top of the file config.
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(url) = env::var(ENV_WEBHOOK_URL) {
            config.alarm_webhook_url = url;
        }
        if let Ok(path) = env::var(ENV_DATABASE_PATH) {
            config.database_path = path;
        }
        if let Ok(threads) = env::var(ENV_THREADS) {
            config.worker_threads = parse_env(ENV_THREADS, &threads)?;
        }
        if let Ok(host) = env::var(ENV_REFERENCE_HOST) {
            config.reference.host = host;
        }
        if let Ok(protocol) = env::var(ENV_REFERENCE_PROTOCOL) {
            config.reference.protocol = protocol;
        }
        if let Ok(port) = env::var(ENV_REFERENCE_PORT) {
            config.reference.api_port = parse_env(ENV_REFERENCE_PORT, &port)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: name.to_string(),
        reason: format!("'{}' is not a valid value", value),
    })
}
