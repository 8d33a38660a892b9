// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.

use std::sync::Arc;

use crate::mailer::{Mailer, NoopMailer};
use crate::market::MarketClient;
use crate::storage::CredentialDb;

/// Session token configuration.
#[derive(Clone)]
pub struct SessionConfig {
    /// HS256 signing secret for session tokens.
    pub secret: String,
}

/// Shared application state passed to all route handlers.
///
/// Cheap to clone; the store, mailer and market client live behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<CredentialDb>,
    /// Session token configuration.
    pub session: SessionConfig,
    mailer: Arc<dyn Mailer>,
    market: Arc<MarketClient>,
}

impl AppState {
    /// Build state with the default (logging) mailer and a market client
    /// configured from the environment.
    pub fn new(store: CredentialDb, session_secret: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            session: SessionConfig {
                secret: session_secret.into(),
            },
            mailer: Arc::new(NoopMailer),
            market: Arc::new(MarketClient::from_env()),
        }
    }

    /// Replace the mailer implementation.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Access the credential store.
    pub fn store(&self) -> &CredentialDb {
        &self.store
    }

    /// Access the outbound mailer.
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Access the market data client.
    pub fn market(&self) -> &MarketClient {
        &self.market
    }
}
