// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Support-chat endpoints for regular users.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{ApiEnvelope, AuthorRole, MessageView, PostMessageRequest};
use crate::state::AppState;

/// Upper bound on a single message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Check a message body: non-blank and within the size bound.
pub fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::validation("Message is too long"));
    }
    Ok(())
}

/// Fetch one user's conversation, oldest first.
///
/// Callers can read their own thread; admins can read any.
#[utoipa::path(
    get,
    path = "/api/messages/{user_id}",
    tag = "messages",
    security(("bearer_auth" = [])),
    params(("user_id" = u64, Path, description = "Owner of the conversation")),
    responses(
        (status = 200, description = "Conversation, ascending by time", body = [MessageView]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not your conversation"),
    )
)]
pub async fn list_messages(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<ApiEnvelope<Vec<MessageView>>>, ApiError> {
    if caller.user_id != user_id && !caller.is_admin() {
        return Err(ApiError::forbidden("Access denied"));
    }

    let messages = state
        .store()
        .messages_for_user(user_id)?
        .iter()
        .map(|m| m.to_view())
        .collect();
    Ok(Json(ApiEnvelope::data(messages)))
}

/// Post a message into a conversation.
///
/// Exactly one row is recorded per call; the `isBot` flag marks client-side
/// automated acknowledgements. Users post only into their own thread.
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    security(("bearer_auth" = [])),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message recorded", body = MessageView),
        (status = 400, description = "Empty or oversized message"),
        (status = 403, description = "Not your conversation"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn post_message(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(body): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<MessageView>>), ApiError> {
    if caller.user_id != body.user_id && !caller.is_admin() {
        return Err(ApiError::forbidden("Access denied"));
    }
    validate_body(&body.message)?;

    let author = if body.is_bot {
        AuthorRole::Bot
    } else {
        AuthorRole::User
    };
    let message = state
        .store()
        .append_message(body.user_id, &body.message, author)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::data(message.to_view())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_rejected() {
        assert!(validate_body("").is_err());
        assert!(validate_body("   \n").is_err());
        assert!(validate_body("hi").is_ok());
    }

    #[test]
    fn body_bound_counts_characters_not_bytes() {
        let max = "ä".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_body(&max).is_ok());
        let over = "ä".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(validate_body(&over).is_err());
    }
}
