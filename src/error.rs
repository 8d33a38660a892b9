// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error type and HTTP mapping.
//!
//! Every failure surfaced to a client is one of the constructors below, each
//! carrying a stable, user-facing message. Storage-level detail is logged and
//! never serialized into a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

/// Error envelope: `{"success": false, "message": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Missing or malformed input (400).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Duplicate unique key (409).
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Bad credentials (401). The message never discloses whether the
    /// account exists.
    pub fn invalid_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }

    /// Authenticated but not allowed (403).
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Referenced entity absent (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Operation invalid for the entity's current state (409).
    pub fn state(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Storage unreachable or failing (503).
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Unexpected internal failure (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            StoreError::EmailTaken(_) => ApiError::conflict("Email already registered"),
            StoreError::InvalidState(message) => ApiError::state(message),
            // Anything else is an I/O or serialization failure inside the
            // store. Log the detail, surface a stable message.
            other => {
                tracing::error!(error = %other, "credential store failure");
                ApiError::unavailable("Service temporarily unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::validation("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let dup = ApiError::conflict("taken");
        assert_eq!(dup.status, StatusCode::CONFLICT);

        let state = ApiError::state("already approved");
        assert_eq!(state.status, StatusCode::CONFLICT);

        let unavailable = ApiError::unavailable("down");
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_credentials_is_opaque() {
        let err = ApiError::invalid_credentials();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid credentials");
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        let nf: ApiError = StoreError::NotFound("User 7".into()).into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);

        let dup: ApiError = StoreError::EmailTaken("a@b.com".into()).into();
        assert_eq!(dup.status, StatusCode::CONFLICT);
        assert_eq!(dup.message, "Email already registered");

        let state: ApiError = StoreError::InvalidState("User already approved".into()).into();
        assert_eq!(state.status, StatusCode::CONFLICT);

        let io: ApiError = StoreError::Serde(serde_json::from_str::<u32>("x").unwrap_err()).into();
        assert_eq!(io.status, StatusCode::SERVICE_UNAVAILABLE);
        // Raw detail must not leak.
        assert_eq!(io.message, "Service temporarily unavailable");
    }

    #[tokio::test]
    async fn into_response_returns_envelope_body() {
        let response = ApiError::validation("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"success":false,"message":"bad data"}"#);
    }
}
