// Node listing endpoint

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::common::{internal_error, ApiResponse, ApiResult};
use crate::web::{AppState, NodeSummary};

/// All nodes registered by `owner_id`, ordered by address
pub async fn get_owner_nodes(
    Path(owner_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<NodeSummary>> {
    match state.database.get_nodes_by_owner(&owner_id).await {
        Ok(records) => Ok(Json(ApiResponse::success(
            records.iter().map(NodeSummary::from).collect(),
        ))),
        Err(e) => Err(internal_error("Failed to list nodes", e)),
    }
}
