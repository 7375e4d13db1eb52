//! Database layer for the node monitor.
//!
//! SQLite is the synchronization boundary between the health-check loop and
//! the alert loop: neither holds in-process state about the other, they only
//! read and write node records here.
//!
//! The module is organized into submodules:
//! - `records` - Record types (entities)
//! - `nodes` - Node record operations

mod nodes;
mod records;

pub use nodes::now_millis;
pub use records::*;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Expose pool for integration test queries
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Opening database at {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("Failed to create parent directory {:?}: {}", parent, e);
                return Err(e.into());
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        // WAL lets the alert loop read while check workers write
        let options = SqliteConnectOptions::from_str(&database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = match SqlitePool::connect_with(options).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to connect to database {}: {}", database_url, e);
                return Err(e.into());
            }
        };

        let database = Self { pool };
        database.initialize_tables().await?;

        info!("Database initialized at {}", database_path);
        Ok(database)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let nodes_table_sql = r#"
            CREATE TABLE IF NOT EXISTS nodes (
                owner_id TEXT NOT NULL,
                address TEXT NOT NULL,
                api_port INTEGER,
                metrics_port INTEGER,
                seed_port INTEGER,
                status TEXT NOT NULL DEFAULT 'unknown',
                errors TEXT NOT NULL DEFAULT '[]',
                last_checked INTEGER,
                last_modified INTEGER,
                last_alarm_sent INTEGER,
                PRIMARY KEY (owner_id, address)
            )
        "#;

        if let Err(e) = sqlx::query(nodes_table_sql).execute(&self.pool).await {
            error!("Failed to create nodes table: {}", e);
            return Err(e.into());
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_last_checked ON nodes(last_checked)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_status ON nodes(status)")
            .execute(&self.pool)
            .await?;

        debug!("Database tables initialized");
        Ok(())
    }
}
