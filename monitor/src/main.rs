use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use monitor::config::ConfigManager;
use monitor::database::Database;
use monitor::health::{NodeHealthAssessor, ReferenceNode};
use monitor::scheduler::CheckScheduler;
use monitor::services::{AlertAggregator, Notifier};
use monitor::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("monitor=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting node monitor");

    let config_manager = ConfigManager::new("config".to_string()).await?;
    let config = config_manager.get_current_config();

    let database = Arc::new(Database::new(&config.database_path).await?);

    let notifier = Arc::new(Notifier::new(config.alarm_webhook_url.clone())?);
    if notifier.is_enabled() {
        info!("Alerts will be sent to: {}", notifier.get_webhook_url());
    } else {
        warn!("⚠️  No webhook URL configured, alerts are only logged");
        warn!("Set 'alarm_webhook_url' in config/main.toml or MONITOR_WEBHOOK_URL to enable delivery");
    }

    let reference = Arc::new(ReferenceNode::new(&config)?);
    info!("Reference node: {}", reference.url());

    let assessor = Arc::new(NodeHealthAssessor::new(&config)?);

    let scheduler = Arc::new(CheckScheduler::new(
        &config,
        database.clone(),
        assessor,
        reference.clone(),
    ));
    tokio::spawn(scheduler.run());

    let aggregator = Arc::new(AlertAggregator::new(
        database.clone(),
        notifier.clone(),
        config.alert_interval(),
    ));
    tokio::spawn(aggregator.run());

    info!(
        "Background loops started: checks every {}s with {} workers, alerts every {}s",
        config.update_frequency_seconds, config.worker_threads, config.alert_interval_seconds
    );

    start_web_server(AppState::new(config, database, reference, notifier)).await?;

    Ok(())
}
