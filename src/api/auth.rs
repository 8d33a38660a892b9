// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login endpoints.

use axum::{extract::State, http::StatusCode, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{ApiEnvelope, LoginRequest, PublicUser, RegisterRequest, UserStatus};
use crate::state::AppState;

/// Successful login payload.
///
/// Carries both `is_admin` (inside the user fields) and the legacy
/// camelCase `isAdmin` the web client reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(flatten)]
    pub user: PublicUser,
}

/// Sign a session token for the given user.
fn issue_token(secret: &str, user: &crate::storage::StoredUser) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        &Claims::for_user(user),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        ApiError::internal("Could not create session")
    })
}

/// Register a new account.
///
/// Accounts start pending; an admin must approve them before wallets or
/// balances exist.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, pending approval"),
        (status = 400, description = "Missing name, email or password"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<PublicUser>>), ApiError> {
    if body.name.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("Name, email and password are required"));
    }

    let password_hash = hash_password(&body.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::internal("Registration failed")
    })?;

    let user = state.store().create_user(
        &body.name,
        &body.email,
        &password_hash,
        false,
        UserStatus::Pending,
    )?;

    tracing::info!(user_id = user.id, "user registered");
    state.mailer().send_welcome(&user.email, &user.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::with_message(
            user.to_public(),
            "Registration successful. Your account is pending approval.",
        )),
    ))
}

/// Log in with email and password.
///
/// Unknown email and wrong password answer identically.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiEnvelope<LoginResponse>>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let user = state
        .store()
        .get_user_by_email(&body.email)?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    let token = issue_token(&state.session.secret, &user)?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(ApiEnvelope::data(LoginResponse {
        token,
        is_admin: user.is_admin,
        user: user.to_public(),
    })))
}
