use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::AppResult;
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;

use crate::matching::engine;
use crate::models::Presence;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetPresenceRequest {
    pub online: bool,
}

/// PUT /presence - upsert the caller's online/offline state
pub async fn set_presence(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetPresenceRequest>,
) -> AppResult<Json<ApiResponse<Presence>>> {
    let presence = engine::set_presence(state.store.as_ref(), user.id, req.online).await?;
    Ok(Json(ApiResponse::ok(presence)))
}
