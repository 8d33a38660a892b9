// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin console endpoints: user review and support replies.
//!
//! Every handler takes the [`AdminOnly`] extractor, which re-reads the
//! caller's row before granting access.

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::AdminOnly;
use crate::error::ApiError;
use crate::models::{
    ApiEnvelope, ApproveUserRequest, AuthorRole, MessageView, PublicUser, RejectUserRequest,
    ReplyRequest,
};
use crate::state::AppState;

use super::messages::validate_body;

/// List every registered user.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All user rows, ascending by id", body = [PublicUser]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<PublicUser>>>, ApiError> {
    let users = state
        .store()
        .list_users()?
        .iter()
        .map(|u| u.to_public())
        .collect();
    Ok(Json(ApiEnvelope::data(users)))
}

/// Approve a pending user, assigning the supplied wallet addresses.
#[utoipa::path(
    post,
    path = "/api/admin/approve-user",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = ApproveUserRequest,
    responses(
        (status = 200, description = "User approved", body = PublicUser),
        (status = 404, description = "No such user"),
        (status = 409, description = "User already approved or rejected"),
    )
)]
pub async fn approve_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(body): Json<ApproveUserRequest>,
) -> Result<Json<ApiEnvelope<PublicUser>>, ApiError> {
    let user = state.store().approve_user(body.user_id, &body.wallets)?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "user approved");
    state.mailer().send_approval(&user.email, &user.name);

    Ok(Json(ApiEnvelope::with_message(
        user.to_public(),
        "User approved",
    )))
}

/// Reject a pending user. Terminal; the row stays but can never be approved.
#[utoipa::path(
    post,
    path = "/api/admin/reject-user",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = RejectUserRequest,
    responses(
        (status = 200, description = "User rejected", body = PublicUser),
        (status = 404, description = "No such user"),
        (status = 409, description = "User already approved or rejected"),
    )
)]
pub async fn reject_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(body): Json<RejectUserRequest>,
) -> Result<Json<ApiEnvelope<PublicUser>>, ApiError> {
    let user = state.store().reject_user(body.user_id)?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "user rejected");

    Ok(Json(ApiEnvelope::with_message(
        user.to_public(),
        "User rejected",
    )))
}

/// Every support conversation, ordered by user id then time.
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All support messages", body = [MessageView]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin"),
    )
)]
pub async fn all_messages(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<MessageView>>>, ApiError> {
    let messages = state
        .store()
        .all_messages()?
        .iter()
        .map(|m| m.to_view())
        .collect();
    Ok(Json(ApiEnvelope::data(messages)))
}

/// Reply to a user's support thread.
///
/// Appending the reply also marks the user's own messages in that thread
/// as read.
#[utoipa::path(
    post,
    path = "/api/admin/reply",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply recorded", body = MessageView),
        (status = 400, description = "Empty or oversized message"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn reply(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(body): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<MessageView>>), ApiError> {
    validate_body(&body.message)?;

    let message = state
        .store()
        .append_message(body.user_id, &body.message, AuthorRole::Admin)?;
    let read = state.store().mark_user_messages_read(body.user_id)?;

    tracing::info!(
        user_id = body.user_id,
        admin_id = admin.user_id,
        marked_read = read,
        "admin replied"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::data(message.to_view())),
    ))
}
