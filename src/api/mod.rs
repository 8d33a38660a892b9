// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    market::AssetPrice,
    models::{
        ApproveUserRequest, AuthorRole, BalanceSet, LoginRequest, MessageView,
        PostMessageRequest, PublicUser, RegisterRequest, RejectUserRequest, ReplyRequest,
        UserStatus, WalletAddress, WalletSet,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod market;
pub mod messages;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/approve-user", post(admin::approve_user))
        .route("/admin/reject-user", post(admin::reject_user))
        .route("/admin/messages", get(admin::all_messages))
        .route("/admin/reply", post(admin::reply))
        .route("/messages/{user_id}", get(messages::list_messages))
        .route("/messages", post(messages::post_message))
        .route("/market/prices", get(market::prices));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        admin::list_users,
        admin::approve_user,
        admin::reject_user,
        admin::all_messages,
        admin::reply,
        messages::list_messages,
        messages::post_message,
        market::prices,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            PublicUser,
            UserStatus,
            WalletAddress,
            WalletSet,
            BalanceSet,
            MessageView,
            AuthorRole,
            AssetPrice,
            RegisterRequest,
            LoginRequest,
            ApproveUserRequest,
            RejectUserRequest,
            PostMessageRequest,
            ReplyRequest,
            auth::LoginResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "admin", description = "User review and support console"),
        (name = "messages", description = "Support chat"),
        (name = "market", description = "Asset spot prices"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::UserStatus;
    use crate::storage::CredentialDb;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn test_app() -> (Router, AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = CredentialDb::open(&dir.path().join("credentials.redb")).unwrap();
        let state = AppState::new(db, SECRET);
        (router(state.clone()), state, dir)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register a user through the API and return their id.
    async fn register(app: &Router, name: &str, email: &str, password: &str) -> u64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"name": name, "email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["data"]["id"].as_u64().unwrap()
    }

    /// Log in through the API and return the session token.
    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Seed an approved admin directly in the store and return a token.
    async fn seeded_admin(app: &Router, state: &AppState) -> String {
        let hash = hash_password("adminpw").unwrap();
        state
            .store()
            .create_user("Admin", "admin@x.com", &hash, true, UserStatus::Approved)
            .unwrap();
        login(app, "admin@x.com", "adminpw").await
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let (app, _state, _dir) = test_app();

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["store"], "ok");

        let (status, _) = send(&app, Method::GET, "/health/live", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let (app, _state, _dir) = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"name": "", "email": "a@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Name, email and password are required");

        register(&app, "Alice", "alice@x.com", "pw123").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"name": "Other", "email": "Alice@X.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Email already registered");
    }

    #[tokio::test]
    async fn register_accepts_short_passwords() {
        // No minimum length; only blank fields are rejected.
        let (app, _state, _dir) = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"name": "Alice", "email": "alice@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        assert_eq!(body["data"]["is_approved"], false);
    }

    #[tokio::test]
    async fn login_is_opaque_about_unknown_accounts() {
        let (app, _state, _dir) = test_app();
        register(&app, "Alice", "alice@x.com", "pw123").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "alice@x.com", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let wrong_password_message = body["message"].clone();

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "nobody@x.com", "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], wrong_password_message);
    }

    #[tokio::test]
    async fn admin_routes_require_admin() {
        let (app, _state, _dir) = test_app();
        register(&app, "Alice", "alice@x.com", "pw123").await;
        let token = login(&app, "alice@x.com", "pw123").await;

        let (status, body) = send(&app, Method::GET, "/api/admin/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token provided");

        let (status, body) =
            send(&app, Method::GET, "/api/admin/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Admin access required");
    }

    #[tokio::test]
    async fn approval_assigns_wallets_once() {
        let (app, state, _dir) = test_app();
        let alice = register(&app, "Alice", "alice@x.com", "pw123").await;
        let admin_token = seeded_admin(&app, &state).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/admin/approve-user",
            Some(&admin_token),
            Some(json!({"userId": alice, "eth_wallet": "0xdead"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        assert_eq!(body["data"]["is_approved"], true);
        assert_eq!(body["data"]["eth_wallet"], "0xdead");
        assert_eq!(body["data"]["btc_wallet"], Value::Null);

        // Second approval is a state conflict, not a repeat.
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/admin/approve-user",
            Some(&admin_token),
            Some(json!({"userId": alice, "eth_wallet": "0xother"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rejected_user_stays_rejected() {
        let (app, state, _dir) = test_app();
        let alice = register(&app, "Alice", "alice@x.com", "pw123").await;
        let admin_token = seeded_admin(&app, &state).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/admin/reject-user",
            Some(&admin_token),
            Some(json!({"userId": alice})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "rejected");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/admin/approve-user",
            Some(&admin_token),
            Some(json!({"userId": alice})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn chat_flow_end_to_end() {
        let (app, state, _dir) = test_app();
        let alice = register(&app, "Alice", "alice@x.com", "pw123").await;
        let alice_token = login(&app, "alice@x.com", "pw123").await;
        let admin_token = seeded_admin(&app, &state).await;

        // Alice posts exactly one message.
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/messages",
            Some(&alice_token),
            Some(json!({"userId": alice, "message": "I need help"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "post failed: {body}");
        assert_eq!(body["data"]["is_bot"], false);

        // The admin console sees it unread.
        let (status, body) = send(
            &app,
            Method::GET,
            "/api/admin/messages",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["is_read"], false);

        // The admin replies; the reply lands in Alice's thread and her
        // message flips to read.
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/admin/reply",
            Some(&admin_token),
            Some(json!({"userId": alice, "message": "On it"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/messages/{alice}"),
            Some(&alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let thread = body["data"].as_array().unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0]["message"], "I need help");
        assert_eq!(thread[0]["is_read"], true);
        assert_eq!(thread[1]["author"], "admin");
        assert_eq!(thread[1]["is_bot"], true);
    }

    #[tokio::test]
    async fn users_cannot_read_or_write_other_threads() {
        let (app, _state, _dir) = test_app();
        let _alice = register(&app, "Alice", "alice@x.com", "pw123").await;
        let bob = register(&app, "Bob", "bob@x.com", "pw456").await;
        let alice_token = login(&app, "alice@x.com", "pw123").await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/messages/{bob}"),
            Some(&alice_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/messages",
            Some(&alice_token),
            Some(json!({"userId": bob, "message": "hi bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn bot_acknowledgement_is_flagged() {
        let (app, _state, _dir) = test_app();
        let alice = register(&app, "Alice", "alice@x.com", "pw123").await;
        let alice_token = login(&app, "alice@x.com", "pw123").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/messages",
            Some(&alice_token),
            Some(json!({"userId": alice, "message": "auto-ack", "isBot": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["author"], "bot");
        assert_eq!(body["data"]["is_bot"], true);
    }

    #[tokio::test]
    async fn openapi_doc_is_served() {
        let (app, _state, _dir) = test_app();
        let (status, body) = send(&app, Method::GET, "/api-doc/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/auth/register"].is_object());
    }
}
