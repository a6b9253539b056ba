use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::AppResult;
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::pagination::{Paginated, PaginationParams};

use crate::matching::engine;
use crate::models::Message;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: String,
    #[serde(flatten)]
    pub message: Message,
}

/// GET /conversations/:id/messages - paginated messages, oldest first
pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MessageView>>>> {
    let messages = engine::list_messages(state.store.as_ref(), &conversation_id, user.id).await?;

    let total = messages.len() as u64;
    let items: Vec<MessageView> = messages
        .into_iter()
        .skip(params.offset() as usize)
        .take(params.limit() as usize)
        .map(|(id, message)| MessageView { id, message })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(items, total, &params))))
}

/// POST /conversations/:id/messages - send a message in a conversation
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<MessageView>>> {
    req.validate()?;

    let (id, message) =
        engine::send_message(state.store.as_ref(), &conversation_id, user.id, &req.text).await?;
    Ok(Json(ApiResponse::ok(MessageView { id, message })))
}
