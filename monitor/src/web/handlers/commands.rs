// Operator command endpoint

use axum::{extract::State, response::Json};
use tracing::info;

use super::common::{bad_request, internal_error, ApiResponse, ApiResult};
use crate::web::{AppState, CommandReply, CommandRequest};

/// Run one text command on behalf of `owner_id`
pub async fn execute_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> ApiResult<CommandReply> {
    let owner_id = request.owner_id.trim();
    if owner_id.is_empty() {
        return Err(bad_request("owner_id must not be empty"));
    }

    info!("Command from {}: {}", owner_id, request.text);
    match state.command_handler.handle(owner_id, &request.text).await {
        Ok(reply) => Ok(Json(ApiResponse::success(CommandReply { reply }))),
        Err(e) => Err(internal_error("Failed to execute command", e)),
    }
}
