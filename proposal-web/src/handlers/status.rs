//! Liveness endpoint

use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, response::Json};

use super::types::StatusResponse;

/// Reports ok when the database answers
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    state.db.ping().await?;
    Ok(Json(StatusResponse {
        status: "ok".to_string(),
    }))
}
