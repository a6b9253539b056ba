use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_store::{collections, from_document, to_document, DocumentStore, Predicate};

use crate::models::{Conversation, Like, LikeType, Message, Pass, Presence};

// Like and conversation documents use deterministic composite ids, so a
// duplicate write converges on the same document instead of creating a
// second edge. Uniqueness per (from, to, likeType) is the id itself.

pub fn like_doc_id(from: Uuid, to: Uuid, like_type: LikeType) -> String {
    format!("{from}_{to}_{like_type}")
}

pub fn pass_doc_id(from: Uuid, to: Uuid) -> String {
    format!("{from}_{to}")
}

/// Conversation id for the unordered pair: participants sort into a
/// canonical order, so both sides derive the same id.
pub fn conversation_doc_id(a: Uuid, b: Uuid, like_type: LikeType) -> String {
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    format!("{first}_{second}_{like_type}")
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeOutcome {
    pub like_id: String,
    pub is_match: bool,
}

/// Record a directional like and detect a mutual match.
///
/// Idempotent: re-liking returns the existing edge. On the first mutual
/// like both edges flip to `matched` and the conversation for the pair is
/// provisioned. Likes are never removed.
pub async fn record_like(
    store: &dyn DocumentStore,
    from: Uuid,
    to: Uuid,
    like_type: LikeType,
) -> AppResult<LikeOutcome> {
    if from == to {
        return Err(AppError::new(ErrorCode::CannotLikeSelf, "cannot like yourself"));
    }

    let like_id = like_doc_id(from, to, like_type);
    if let Some(doc) = store.get(collections::LIKES, &like_id).await? {
        let existing: Like = from_document(doc)?;
        return Ok(LikeOutcome {
            like_id,
            is_match: existing.matched,
        });
    }

    let like = Like {
        from_user_id: from,
        to_user_id: to,
        like_type,
        matched: false,
        created_at: Utc::now(),
    };
    store
        .set(collections::LIKES, &like_id, to_document(&like)?, false)
        .await?;

    let reciprocal_id = like_doc_id(to, from, like_type);
    if store.get(collections::LIKES, &reciprocal_id).await?.is_some() {
        store
            .update(collections::LIKES, &like_id, json!({"matched": true}))
            .await?;
        store
            .update(collections::LIKES, &reciprocal_id, json!({"matched": true}))
            .await?;
        get_or_create_conversation(store, from, to, like_type).await?;

        tracing::info!(from = %from, to = %to, like_type = %like_type, "mutual like, match created");
        return Ok(LikeOutcome {
            like_id,
            is_match: true,
        });
    }

    Ok(LikeOutcome {
        like_id,
        is_match: false,
    })
}

/// Likes the given user has received.
pub async fn likes_received(store: &dyn DocumentStore, user: Uuid) -> AppResult<Vec<Like>> {
    let rows = store
        .query(
            collections::LIKES,
            &[Predicate::eq("toUserId", user.to_string())],
            None,
        )
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(_, doc)| from_document(doc).ok())
        .collect())
}

/// Whether `from` has already liked `to` with either like type.
pub async fn has_liked(store: &dyn DocumentStore, from: Uuid, to: Uuid) -> AppResult<bool> {
    for like_type in [LikeType::Heart, LikeType::Friendship] {
        if store
            .get(collections::LIKES, &like_doc_id(from, to, like_type))
            .await?
            .is_some()
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Look up or provision the conversation for an unordered pair and like
/// type. Idempotent regardless of which side calls first.
pub async fn get_or_create_conversation(
    store: &dyn DocumentStore,
    a: Uuid,
    b: Uuid,
    like_type: LikeType,
) -> AppResult<(String, Conversation)> {
    let conversation_id = conversation_doc_id(a, b, like_type);
    if let Some(doc) = store.get(collections::CONVERSATIONS, &conversation_id).await? {
        return Ok((conversation_id, from_document(doc)?));
    }

    let (first, second) = if a < b { (a, b) } else { (b, a) };
    let conversation = Conversation {
        participants: [first, second],
        like_type,
        last_message: String::new(),
        last_message_time: None,
        last_message_sender_id: None,
        unread_count: [(first.to_string(), 0), (second.to_string(), 0)]
            .into_iter()
            .collect(),
        created_at: Utc::now(),
    };
    store
        .set(
            collections::CONVERSATIONS,
            &conversation_id,
            to_document(&conversation)?,
            false,
        )
        .await?;

    Ok((conversation_id, conversation))
}

/// Load a conversation the caller participates in.
pub async fn member_conversation(
    store: &dyn DocumentStore,
    conversation_id: &str,
    user: Uuid,
) -> AppResult<Conversation> {
    let doc = store
        .get(collections::CONVERSATIONS, conversation_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;
    let conversation: Conversation = from_document(doc)?;

    if !conversation.has_participant(user) {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }
    Ok(conversation)
}

/// The caller's conversations, most recently active first.
pub async fn list_conversations(
    store: &dyn DocumentStore,
    user: Uuid,
) -> AppResult<Vec<(String, Conversation)>> {
    let rows = store
        .query(
            collections::CONVERSATIONS,
            &[Predicate::array_contains("participants", user.to_string())],
            None,
        )
        .await?;

    let mut conversations: Vec<(String, Conversation)> = rows
        .into_iter()
        .filter_map(|(id, doc)| from_document(doc).ok().map(|c| (id, c)))
        .collect();

    conversations.sort_by(|(_, a), (_, b)| {
        let a_time = a.last_message_time.unwrap_or(a.created_at);
        let b_time = b.last_message_time.unwrap_or(b.created_at);
        b_time.cmp(&a_time)
    });

    Ok(conversations)
}

/// Append a message and maintain the conversation's preview and unread
/// bookkeeping: recipient's counter goes up, sender's resets.
pub async fn send_message(
    store: &dyn DocumentStore,
    conversation_id: &str,
    sender: Uuid,
    text: &str,
) -> AppResult<(String, Message)> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyMessage, "message text is required"));
    }

    let mut conversation = member_conversation(store, conversation_id, sender).await?;
    let recipient = conversation
        .partner_of(sender)
        .ok_or_else(|| AppError::internal("two-party conversation without a partner"))?;

    let message = Message {
        sender_id: sender,
        text: text.to_string(),
        timestamp: Utc::now(),
        read: false,
    };
    let message_id = Uuid::now_v7().to_string();
    store
        .set(
            &collections::messages(conversation_id),
            &message_id,
            to_document(&message)?,
            false,
        )
        .await?;

    conversation.last_message = message.text.clone();
    conversation.last_message_time = Some(message.timestamp);
    conversation.last_message_sender_id = Some(sender);
    *conversation
        .unread_count
        .entry(recipient.to_string())
        .or_insert(0) += 1;
    conversation.unread_count.insert(sender.to_string(), 0);

    store
        .set(
            collections::CONVERSATIONS,
            conversation_id,
            to_document(&conversation)?,
            false,
        )
        .await?;

    Ok((message_id, message))
}

/// Messages of a conversation, oldest first.
pub async fn list_messages(
    store: &dyn DocumentStore,
    conversation_id: &str,
    user: Uuid,
) -> AppResult<Vec<(String, Message)>> {
    member_conversation(store, conversation_id, user).await?;

    let rows = store
        .query(&collections::messages(conversation_id), &[], None)
        .await?;
    let mut messages: Vec<(String, Message)> = rows
        .into_iter()
        .filter_map(|(id, doc)| from_document(doc).ok().map(|m| (id, m)))
        .collect();
    messages.sort_by_key(|(_, m)| m.timestamp);
    Ok(messages)
}

/// Zero the caller's unread counter, leaving the counterpart's untouched.
pub async fn mark_read(
    store: &dyn DocumentStore,
    conversation_id: &str,
    user: Uuid,
) -> AppResult<()> {
    let mut conversation = member_conversation(store, conversation_id, user).await?;
    conversation.unread_count.insert(user.to_string(), 0);
    store
        .update(
            collections::CONVERSATIONS,
            conversation_id,
            json!({"unreadCount": conversation.unread_count}),
        )
        .await?;
    Ok(())
}

/// Record a skip. Idempotent; the pass hides the candidate from discovery
/// until passes are cleared.
pub async fn record_pass(store: &dyn DocumentStore, from: Uuid, to: Uuid) -> AppResult<String> {
    if from == to {
        return Err(AppError::new(ErrorCode::CannotPassSelf, "cannot pass on yourself"));
    }

    let pass_id = pass_doc_id(from, to);
    if store.get(collections::PASSES, &pass_id).await?.is_none() {
        let pass = Pass {
            from_user_id: from,
            to_user_id: to,
            created_at: Utc::now(),
        };
        store
            .set(collections::PASSES, &pass_id, to_document(&pass)?, false)
            .await?;
    }
    Ok(pass_id)
}

/// Delete every pass the viewer recorded ("see everyone again"). Returns
/// how many were removed.
pub async fn clear_passes(store: &dyn DocumentStore, viewer: Uuid) -> AppResult<usize> {
    let rows = store
        .query(
            collections::PASSES,
            &[Predicate::eq("fromUserId", viewer.to_string())],
            None,
        )
        .await?;

    let count = rows.len();
    for (id, _) in rows {
        store.delete(collections::PASSES, &id).await?;
    }
    Ok(count)
}

/// Upsert the caller's presence record.
pub async fn set_presence(
    store: &dyn DocumentStore,
    user: Uuid,
    online: bool,
) -> AppResult<Presence> {
    let presence = Presence {
        online,
        last_seen: Utc::now(),
    };
    store
        .set(
            collections::PRESENCE,
            &user.to_string(),
            to_document(&presence)?,
            true,
        )
        .await?;
    Ok(presence)
}
