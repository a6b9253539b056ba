use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::AppResult;
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;

use crate::matching::engine;
use crate::models::{Conversation, LikeType};
use crate::AppState;

// --- Response DTOs ---

#[derive(Debug, Serialize)]
pub struct ConversationPreview {
    pub id: String,
    pub partner_id: Option<Uuid>,
    pub like_type: LikeType,
    pub last_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_sender_id: Option<Uuid>,
    /// The caller's own unread counter.
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub id: String,
    #[serde(flatten)]
    pub conversation: Conversation,
}

// --- Handlers ---

/// GET /conversations - the caller's conversations, most recent activity first
pub async fn list_conversations(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationPreview>>>> {
    let conversations = engine::list_conversations(state.store.as_ref(), user.id).await?;

    let previews = conversations
        .into_iter()
        .map(|(id, conversation)| ConversationPreview {
            id,
            partner_id: conversation.partner_of(user.id),
            like_type: conversation.like_type,
            unread_count: conversation.unread_for(user.id),
            last_message: conversation.last_message,
            last_message_time: conversation.last_message_time,
            last_message_sender_id: conversation.last_message_sender_id,
            created_at: conversation.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::ok(previews)))
}

/// GET /conversations/:id
pub async fn get_conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<ApiResponse<ConversationDetail>>> {
    let conversation =
        engine::member_conversation(state.store.as_ref(), &conversation_id, user.id).await?;
    Ok(Json(ApiResponse::ok(ConversationDetail {
        id: conversation_id,
        conversation,
    })))
}

/// POST /conversations/:id/read - zero the caller's unread counter
pub async fn mark_read(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    engine::mark_read(state.store.as_ref(), &conversation_id, user.id).await?;
    Ok(Json(ApiResponse::ok(())))
}
