//! Node record database operations.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{NodeCounts, NodeRecord, NodeStatus};
use super::Database;

/// Current time at the precision the store keeps (milliseconds), so values
/// written and read back compare equal.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

fn to_millis(value: Option<DateTime<Utc>>) -> Option<i64> {
    value.map(|dt| dt.timestamp_millis())
}

fn from_millis(column: &str, value: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|ms| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| anyhow!("Column {} holds out-of-range timestamp {}", column, ms))
        })
        .transpose()
}

fn port_from_row(row: &SqliteRow, column: &str) -> Result<Option<u16>> {
    let raw: Option<i64> = row.try_get(column)?;
    raw.map(|p| u16::try_from(p).map_err(|_| anyhow!("Column {} holds invalid port {}", column, p)))
        .transpose()
}

fn node_from_row(row: &SqliteRow) -> Result<NodeRecord> {
    let status: String = row.try_get("status")?;
    let errors: String = row.try_get("errors")?;

    Ok(NodeRecord {
        owner_id: row.try_get("owner_id")?,
        address: row.try_get("address")?,
        api_port: port_from_row(row, "api_port")?,
        metrics_port: port_from_row(row, "metrics_port")?,
        seed_port: port_from_row(row, "seed_port")?,
        status: status.parse::<NodeStatus>()?,
        errors: serde_json::from_str(&errors)?,
        last_checked: from_millis("last_checked", row.try_get("last_checked")?)?,
        last_modified: from_millis("last_modified", row.try_get("last_modified")?)?,
        last_alarm_sent: from_millis("last_alarm_sent", row.try_get("last_alarm_sent")?)?,
    })
}

const NODE_COLUMNS: &str = "owner_id, address, api_port, metrics_port, seed_port, status, errors, \
                            last_checked, last_modified, last_alarm_sent";

impl Database {
    /// Insert or overwrite a node keyed by `(owner_id, address)`.
    ///
    /// Re-registering resets health state so the node is checked on the next
    /// scheduler cycle. Returns the stored record.
    pub async fn register_node(&self, record: &NodeRecord) -> Result<NodeRecord> {
        debug!("Registering node {}", record.key());

        let errors = serde_json::to_string(&record.errors)?;
        let result = sqlx::query(
            r#"
            INSERT INTO nodes (
                owner_id, address, api_port, metrics_port, seed_port,
                status, errors, last_checked, last_modified, last_alarm_sent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id, address) DO UPDATE SET
                api_port = excluded.api_port,
                metrics_port = excluded.metrics_port,
                seed_port = excluded.seed_port,
                status = excluded.status,
                errors = excluded.errors,
                last_checked = excluded.last_checked,
                last_modified = excluded.last_modified,
                last_alarm_sent = excluded.last_alarm_sent
            "#,
        )
        .bind(&record.owner_id)
        .bind(&record.address)
        .bind(record.api_port.map(i64::from))
        .bind(record.metrics_port.map(i64::from))
        .bind(record.seed_port.map(i64::from))
        .bind(record.status.as_str())
        .bind(errors)
        .bind(to_millis(record.last_checked))
        .bind(to_millis(record.last_modified))
        .bind(to_millis(record.last_alarm_sent))
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            error!("Failed to register node {}: {}", record.key(), e);
            return Err(e.into());
        }

        self.get_node(&record.owner_id, &record.address)
            .await?
            .ok_or_else(|| anyhow!("Node {} vanished right after upsert", record.key()))
    }

    /// Delete a node. Deleting an absent node is a no-op; the return value
    /// tells whether a row was removed.
    pub async fn delete_node(&self, owner_id: &str, address: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE owner_id = ? AND address = ?")
            .bind(owner_id)
            .bind(address)
            .execute(&self.pool)
            .await?;

        debug!(
            "Delete {}/{} removed {} rows",
            owner_id,
            address,
            result.rows_affected()
        );
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_node(&self, owner_id: &str, address: &str) -> Result<Option<NodeRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM nodes WHERE owner_id = ? AND address = ?",
            NODE_COLUMNS
        ))
        .bind(owner_id)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(node_from_row).transpose()
    }

    pub async fn get_nodes_by_owner(&self, owner_id: &str) -> Result<Vec<NodeRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM nodes WHERE owner_id = ? ORDER BY address",
            NODE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(node_from_row).collect()
    }

    /// All records currently failing, alert-eligible or not
    pub async fn get_unhealthy_nodes(&self) -> Result<Vec<NodeRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM nodes WHERE status = ? ORDER BY owner_id, address",
            NODE_COLUMNS
        ))
        .bind(NodeStatus::Unhealthy.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(node_from_row).collect()
    }

    /// Records never checked or last checked before `threshold`, oldest first
    pub async fn get_stale_nodes(&self, threshold: DateTime<Utc>) -> Result<Vec<NodeRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM nodes WHERE last_checked IS NULL OR last_checked < ? ORDER BY last_checked",
            NODE_COLUMNS
        ))
        .bind(threshold.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(node_from_row).collect()
    }

    /// Persist the outcome of a health check.
    ///
    /// Only the health columns are written, so a concurrent alert stamp is
    /// never overwritten and a node deleted mid-check is not recreated.
    /// Returns false when the node no longer exists.
    ///
    /// A change that lands after an alert stamp is dated past that stamp.
    /// The aggregator may have alerted on the pre-check state between the
    /// check reading its clock and this write; the change must stay eligible.
    pub async fn store_check_result(&self, record: &NodeRecord) -> Result<bool> {
        let errors = serde_json::to_string(&record.errors)?;
        let result = sqlx::query(
            r#"
            UPDATE nodes
            SET status = ?1,
                errors = ?2,
                last_checked = ?3,
                last_modified = CASE
                    WHEN last_modified IS ?4 THEN last_modified
                    ELSE MAX(?4, COALESCE(last_alarm_sent + 1, ?4))
                END
            WHERE owner_id = ?5 AND address = ?6
            "#,
        )
        .bind(record.status.as_str())
        .bind(errors)
        .bind(to_millis(record.last_checked))
        .bind(to_millis(record.last_modified))
        .bind(&record.owner_id)
        .bind(&record.address)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp `last_alarm_sent` for a record the aggregator just alerted on.
    ///
    /// The stamp only lands if `last_modified` still equals the value the
    /// aggregator observed. If a check changed the record in between, it
    /// stays eligible and is alerted again next cycle. The stamp is never
    /// earlier than `last_modified`.
    pub async fn mark_alarm_sent(&self, record: &NodeRecord, sent_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE nodes
            SET last_alarm_sent = MAX(?1, last_modified)
            WHERE owner_id = ?2 AND address = ?3 AND last_modified IS ?4
            "#,
        )
        .bind(sent_at.timestamp_millis())
        .bind(&record.owner_id)
        .bind(&record.address)
        .bind(to_millis(record.last_modified))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_nodes(&self) -> Result<NodeCounts> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM nodes GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut counts = NodeCounts::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            match status.parse::<NodeStatus>()? {
                NodeStatus::Unknown => counts.unknown = count,
                NodeStatus::Healthy => counts.healthy = count,
                NodeStatus::Unhealthy => counts.unhealthy = count,
            }
            counts.total += count;
        }
        Ok(counts)
    }
}
