// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential database backed by redb (pure Rust, ACID).
//!
//! Write transactions in redb are serialized, so the duplicate-email check
//! in `create_user` and the compare-and-set in `approve_user` are race-free
//! without any in-process locking. Read transactions see a consistent
//! snapshot and are safe under concurrent appends.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary user table: user_id → serialized user row (JSON bytes).
pub(super) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Uniqueness index: lowercased email → user_id.
pub(super) const EMAIL_INDEX: TableDefinition<&str, u64> = TableDefinition::new("email_index");

/// Primary message table: message_id → serialized message row (JSON bytes).
pub(super) const MESSAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("messages");

/// Index: composite key → message_id.
/// Key format: `user_id_be | timestamp_be | message_id_be` for ascending
/// per-user range scans (oldest first, id as tie-break within a second).
pub(super) const USER_MSG_INDEX: TableDefinition<&[u8], u64> =
    TableDefinition::new("user_msg_index");

/// Id counters: name ("next_user_id" | "next_message_id") → last issued id.
pub(super) const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the user_msg_index table.
pub(super) fn msg_index_key(user_id: u64, timestamp: i64, message_id: u64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..16].copy_from_slice(&(timestamp as u64).to_be_bytes());
    key[16..].copy_from_slice(&message_id.to_be_bytes());
    key
}

/// Lower bound for a range scan over one user's messages.
pub(super) fn msg_prefix(user_id: u64) -> [u8; 8] {
    user_id.to_be_bytes()
}

/// Upper bound for a range scan over one user's messages.
pub(super) fn msg_prefix_end(user_id: u64) -> [u8; 24] {
    let mut end = [0xFF_u8; 24];
    end[..8].copy_from_slice(&user_id.to_be_bytes());
    end
}

// =============================================================================
// CredentialDb
// =============================================================================

/// Embedded ACID credential database.
pub struct CredentialDb {
    pub(super) db: Database,
}

impl CredentialDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(MESSAGES)?;
            let _ = write_txn.open_table(USER_MSG_INDEX)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap liveness check used by the readiness probe.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(COUNTERS)?;
        Ok(())
    }

    /// Issue the next id from the named counter.
    ///
    /// Must be called inside the same write transaction as the insert that
    /// consumes the id, so an aborted insert never burns it.
    pub(super) fn next_id(
        counters: &mut redb::Table<'_, &str, u64>,
        counter: &str,
    ) -> StoreResult<u64> {
        let current = counters.get(counter)?.map(|v| v.value()).unwrap_or(0);
        let next = current + 1;
        counters.insert(counter, next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn test_db() -> (CredentialDb, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = CredentialDb::open(&dir.path().join("credentials.redb")).expect("open db");
        (db, dir)
    }

    #[test]
    fn open_creates_tables_and_pings() {
        let (db, _dir) = test_db();
        db.ping().unwrap();
    }

    #[test]
    fn reopen_preserves_data_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.redb");
        {
            let _db = CredentialDb::open(&path).unwrap();
        }
        let db = CredentialDb::open(&path).unwrap();
        db.ping().unwrap();
    }

    #[test]
    fn counters_are_monotonic() {
        let (db, _dir) = test_db();
        let write_txn = db.db.begin_write().unwrap();
        {
            let mut counters = write_txn.open_table(COUNTERS).unwrap();
            assert_eq!(CredentialDb::next_id(&mut counters, "next_user_id").unwrap(), 1);
            assert_eq!(CredentialDb::next_id(&mut counters, "next_user_id").unwrap(), 2);
            assert_eq!(
                CredentialDb::next_id(&mut counters, "next_message_id").unwrap(),
                1
            );
        }
        write_txn.commit().unwrap();
    }

    #[test]
    fn message_index_keys_sort_ascending() {
        let earlier = msg_index_key(1, 100, 1);
        let later = msg_index_key(1, 101, 2);
        let same_second = msg_index_key(1, 100, 2);
        let other_user = msg_index_key(2, 50, 1);

        assert!(earlier < same_second);
        assert!(same_second < later);
        assert!(later < other_user);
        assert!(msg_prefix(1).as_slice() <= earlier.as_slice());
        assert!(earlier.as_slice() < msg_prefix_end(1).as_slice());
        assert!(other_user.as_slice() > msg_prefix_end(1).as_slice());
    }
}
