// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session-token authentication for the platform API.
//!
//! ## Auth Flow
//!
//! 1. `POST /auth/login` verifies the password and issues an HS256 JWT
//!    carrying the numeric user id and role
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The [`Auth`] extractor verifies signature and expiry
//! 4. The [`AdminOnly`] extractor additionally re-reads the caller's row
//!    from the credential store, so a stale token cannot outlive a revoked
//!    admin bit
//!
//! ## Security
//!
//! - All non-health, non-auth endpoints require authentication
//! - Clock skew tolerance is 60 seconds
//! - Tokens expire after 24 hours

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;

pub use claims::{AuthenticatedUser, Claims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
