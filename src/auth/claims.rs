// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoredUser;

use super::roles::Role;

/// How long an issued session token stays valid.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the numeric user id
    pub sub: u64,

    /// Email at issuance (informational; the store row is authoritative)
    pub email: String,

    /// Role at issuance
    pub role: Role,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Build claims for a freshly authenticated user.
    pub fn for_user(user: &StoredUser) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: if user.is_admin { Role::Admin } else { Role::Client },
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type used throughout the application to represent
/// the caller making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Numeric user id (`sub` claim)
    pub user_id: u64,

    /// Email at token issuance
    pub email: String,

    /// Role at token issuance
    pub role: Role,
}

impl AuthenticatedUser {
    /// Build from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    /// Check if this caller carries the admin role.
    ///
    /// Admin *operations* must not rely on this alone; [`super::AdminOnly`]
    /// re-reads the store row before granting access.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
