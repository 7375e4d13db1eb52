// Service status endpoint

use axum::{extract::State, response::Json};
use chrono::Utc;

use super::common::{internal_error, ApiResponse, ApiResult};
use crate::web::{AppState, ServiceStatus};

pub async fn get_status(State(state): State<AppState>) -> ApiResult<ServiceStatus> {
    let nodes = match state.database.count_nodes().await {
        Ok(counts) => counts,
        Err(e) => return Err(internal_error("Failed to count nodes", e)),
    };

    Ok(Json(ApiResponse::success(ServiceStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        nodes,
        alerts_enabled: state.notifier.is_enabled(),
        reference: state.reference.current().await,
    })))
}
