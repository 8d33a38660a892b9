// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Store
//!
//! Embedded ACID store (redb) holding the two business tables of the
//! platform: users and support messages. It is the single source of truth;
//! uniqueness constraints and state transitions are enforced inside write
//! transactions here, never by check-then-act in the handlers.
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized user row (JSON bytes)
//! - `email_index`: lowercased email → user_id (uniqueness constraint)
//! - `messages`: message_id → serialized message row (JSON bytes)
//! - `user_msg_index`: composite key (user_id_be|timestamp_be|message_id_be)
//!   → message_id, for ascending per-user scans
//! - `counters`: name → last issued id

pub mod database;
pub mod messages;
pub mod users;

pub use database::{CredentialDb, StoreError, StoreResult};
pub use messages::StoredMessage;
pub use users::StoredUser;
