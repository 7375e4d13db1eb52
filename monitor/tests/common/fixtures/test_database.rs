//! Test database utilities backed by a temporary SQLite file

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

use monitor::database::Database;

/// Database in a temp directory that is removed on drop
pub struct TestDatabase {
    database: Arc<Database>,
    path: String,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir
            .path()
            .join("data")
            .join("nodes.db")
            .to_string_lossy()
            .to_string();
        let database = Arc::new(Database::new(&path).await?);

        Ok(Self {
            database,
            path,
            _temp_dir: temp_dir,
        })
    }

    pub fn database(&self) -> Arc<Database> {
        self.database.clone()
    }

    pub fn pool(&self) -> &SqlitePool {
        self.database.pool()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Clear all data from tables (useful between tests)
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM nodes").execute(self.pool()).await?;
        Ok(())
    }
}
