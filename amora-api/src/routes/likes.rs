use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;
use amora_store::collections;

use crate::matching::engine::{self, LikeOutcome};
use crate::models::{Like, LikeType};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendLikeRequest {
    pub to_user_id: Uuid,
    #[serde(default)]
    pub like_type: LikeType,
}

/// POST /likes - record a like and report whether it completed a match
pub async fn send_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<ApiResponse<LikeOutcome>>> {
    let target = state
        .store
        .get(collections::PROFILES, &req.to_user_id.to_string())
        .await?;
    if target.is_none() {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "liked profile not found"));
    }

    let outcome =
        engine::record_like(state.store.as_ref(), user.id, req.to_user_id, req.like_type).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub already_liked: bool,
}

/// GET /likes/check/:target_id - check if current user already liked target
pub async fn check_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<LikeCheckResponse>>> {
    let already_liked = engine::has_liked(state.store.as_ref(), user.id, target_id).await?;
    Ok(Json(ApiResponse::ok(LikeCheckResponse { already_liked })))
}

/// GET /likes/received - likes the caller has received ("likes you" screen)
pub async fn likes_received(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Like>>>> {
    let likes = engine::likes_received(state.store.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(likes)))
}
