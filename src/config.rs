// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the embedded database file | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_SECRET` | HS256 secret for session tokens | Required for production |
//! | `ADMIN_EMAIL` | Email of the seeded admin account | Optional |
//! | `ADMIN_PASSWORD` | Password of the seeded admin account | Optional |
//! | `MARKET_API_URL` | Base URL of the market-data API | CoinGecko public API |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// The credential database (`credentials.redb`) lives inside this directory.
/// It is created on first start if it does not exist.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the embedded credential database inside the data directory.
pub const DB_FILE_NAME: &str = "credentials.redb";

/// Environment variable name for the session token signing secret.
///
/// Login issues HS256 tokens signed with this secret. When unset the server
/// falls back to a fixed development secret and logs a warning.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

/// Development-only fallback signing secret.
///
/// MUST NOT be relied on in production deployments.
pub const DEV_SESSION_SECRET: &str = "coinvest-dev-secret";

/// Environment variable name for the seeded admin account email.
///
/// Admin accounts are provisioned only at startup; there is no
/// admin-creation endpoint.
pub const ADMIN_EMAIL_ENV: &str = "ADMIN_EMAIL";

/// Environment variable name for the seeded admin account password.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Environment variable name for the market-data API base URL.
pub const MARKET_API_URL_ENV: &str = "MARKET_API_URL";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Default bind port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Parse a `PORT` value.
///
/// A malformed value is logged and replaced by the default rather than
/// silently masked.
pub fn parse_port(raw: Option<&str>) -> u16 {
    match raw {
        None => DEFAULT_PORT,
        Some(value) => match value.parse() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!(value, default = DEFAULT_PORT, "invalid PORT value, using default");
                DEFAULT_PORT
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_port_accepts_valid_values() {
        assert_eq!(parse_port(Some("3000")), 3000);
        assert_eq!(parse_port(None), DEFAULT_PORT);
    }

    #[test]
    fn parse_port_falls_back_on_garbage() {
        assert_eq!(parse_port(Some("eighty")), DEFAULT_PORT);
        assert_eq!(parse_port(Some("")), DEFAULT_PORT);
        assert_eq!(parse_port(Some("70000")), DEFAULT_PORT);
    }
}
