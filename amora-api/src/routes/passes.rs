use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::AppResult;
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;

use crate::matching::engine;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordPassRequest {
    pub to_user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PassResponse {
    pub pass_id: String,
}

/// POST /passes - skip a candidate
pub async fn record_pass(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordPassRequest>,
) -> AppResult<Json<ApiResponse<PassResponse>>> {
    let pass_id = engine::record_pass(state.store.as_ref(), user.id, req.to_user_id).await?;
    Ok(Json(ApiResponse::ok(PassResponse { pass_id })))
}

#[derive(Debug, Serialize)]
pub struct ClearPassesResponse {
    pub cleared: usize,
}

/// DELETE /passes - forget every pass, so passed profiles show up again
pub async fn clear_passes(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ClearPassesResponse>>> {
    let cleared = engine::clear_passes(state.store.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(ClearPassesResponse { cleared })))
}
