// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::PathBuf};

use coinvest_server::{api::router, auth::password::hash_password, config, state::AppState, storage::CredentialDb};

#[tokio::main]
async fn main() {
    init_tracing();

    // Open (or create) the credential database
    let data_dir = env::var(config::DATA_DIR_ENV)
        .unwrap_or_else(|_| config::DEFAULT_DATA_DIR.to_string());
    let db_path = PathBuf::from(&data_dir).join(config::DB_FILE_NAME);
    let store = match CredentialDb::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(path = %db_path.display(), error = %e, "failed to open credential store");
            std::process::exit(1);
        }
    };

    let session_secret = env::var(config::SESSION_SECRET_ENV).unwrap_or_else(|_| {
        tracing::warn!(
            "{} not set, using the development signing secret",
            config::SESSION_SECRET_ENV
        );
        config::DEV_SESSION_SECRET.to_string()
    });

    seed_admin(&store);

    let state = AppState::new(store, session_secret);
    let app = router(state);

    // Parse bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = config::parse_port(env::var(config::PORT_ENV).ok().as_deref());

    let addr: SocketAddr = match format!("{host}:{port}").parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host, port, error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };

    tracing::info!("Coinvest server listening on http://{addr} (docs at /docs)");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber.
///
/// `LOG_FORMAT=json` selects structured output; anything else gets the
/// human-readable formatter. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Provision the admin account from `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
///
/// There is no admin-creation endpoint; this seed is the only way an admin
/// comes into existence. A no-op when the variables are unset or the
/// account already exists.
fn seed_admin(store: &CredentialDb) {
    let (Ok(email), Ok(password)) = (
        env::var(config::ADMIN_EMAIL_ENV),
        env::var(config::ADMIN_PASSWORD_ENV),
    ) else {
        tracing::info!("admin seed skipped, ADMIN_EMAIL/ADMIN_PASSWORD not set");
        return;
    };

    let hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "failed to hash admin password");
            std::process::exit(1);
        }
    };

    match store.seed_admin("Admin", &email, &hash) {
        Ok(Some(admin)) => tracing::info!(admin_id = admin.id, "admin account seeded"),
        Ok(None) => tracing::debug!("admin account already present"),
        Err(e) => {
            tracing::error!(error = %e, "admin seed failed");
            std::process::exit(1);
        }
    }
}

/// Resolve when the process receives SIGTERM or ctrl-c.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
