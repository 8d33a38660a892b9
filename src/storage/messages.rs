// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Support-message log: append-only rows plus a per-user ascending index.
//!
//! Rows are never deleted and, apart from the `is_read` flag, never change
//! after insert.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::models::{AuthorRole, MessageView};

use super::database::{
    msg_index_key, msg_prefix, msg_prefix_end, CredentialDb, StoreError, StoreResult, COUNTERS,
    MESSAGES, USERS, USER_MSG_INDEX,
};

/// Message row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    pub id: u64,
    pub user_id: u64,
    pub body: String,
    pub author: AuthorRole,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// API projection; `is_bot` is derived so legacy chat clients keep
    /// rendering bot and admin messages on the staff side.
    pub fn to_view(&self) -> MessageView {
        MessageView {
            id: self.id,
            user_id: self.user_id,
            message: self.body.clone(),
            author: self.author,
            is_bot: self.author != AuthorRole::User,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

fn decode_message(bytes: &[u8]) -> StoreResult<StoredMessage> {
    Ok(serde_json::from_slice(bytes)?)
}

impl CredentialDb {
    /// Append a message to a user's conversation.
    ///
    /// The owning user must exist (weak referential integrity, no cascade).
    pub fn append_message(
        &self,
        user_id: u64,
        body: &str,
        author: AuthorRole,
    ) -> StoreResult<StoredMessage> {
        let write_txn = self.db.begin_write()?;
        let message = {
            let users = write_txn.open_table(USERS)?;
            if users.get(user_id)?.is_none() {
                return Err(StoreError::NotFound(format!("User {user_id}")));
            }
            drop(users);

            let mut counters = write_txn.open_table(COUNTERS)?;
            let id = Self::next_id(&mut counters, "next_message_id")?;
            drop(counters);

            let message = StoredMessage {
                id,
                user_id,
                body: body.to_string(),
                author,
                is_read: false,
                created_at: Utc::now(),
            };

            let mut messages = write_txn.open_table(MESSAGES)?;
            let json = serde_json::to_vec(&message)?;
            messages.insert(id, json.as_slice())?;

            let mut index = write_txn.open_table(USER_MSG_INDEX)?;
            let key = msg_index_key(user_id, message.created_at.timestamp(), id);
            index.insert(key.as_slice(), id)?;
            message
        };
        write_txn.commit()?;
        Ok(message)
    }

    /// One user's conversation, ascending by creation time.
    pub fn messages_for_user(&self, user_id: u64) -> StoreResult<Vec<StoredMessage>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_MSG_INDEX)?;
        let messages = read_txn.open_table(MESSAGES)?;

        let prefix = msg_prefix(user_id);
        let prefix_end = msg_prefix_end(user_id);

        let mut rows = Vec::new();
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            let (_, id) = entry?;
            if let Some(value) = messages.get(id.value())? {
                rows.push(decode_message(value.value())?);
            }
        }
        Ok(rows)
    }

    /// Every conversation, ordered by user id then creation time.
    /// Admin-console view; grouping happens client-side.
    pub fn all_messages(&self) -> StoreResult<Vec<StoredMessage>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_MSG_INDEX)?;
        let messages = read_txn.open_table(MESSAGES)?;

        let mut rows = Vec::new();
        for entry in index.iter()? {
            let (_, id) = entry?;
            if let Some(value) = messages.get(id.value())? {
                rows.push(decode_message(value.value())?);
            }
        }
        Ok(rows)
    }

    /// Mark a user's user-authored messages read. Returns how many flipped.
    ///
    /// Called when an admin replies to the conversation.
    pub fn mark_user_messages_read(&self, user_id: u64) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let flipped = {
            let index = write_txn.open_table(USER_MSG_INDEX)?;
            let prefix = msg_prefix(user_id);
            let prefix_end = msg_prefix_end(user_id);

            let mut ids = Vec::new();
            for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
                let (_, id) = entry?;
                ids.push(id.value());
            }
            drop(index);

            let mut messages = write_txn.open_table(MESSAGES)?;
            let mut flipped = 0;
            for id in ids {
                let existing = messages.get(id)?.map(|v| v.value().to_vec());
                let Some(bytes) = existing else { continue };
                let mut message = decode_message(&bytes)?;
                if message.author == AuthorRole::User && !message.is_read {
                    message.is_read = true;
                    let json = serde_json::to_vec(&message)?;
                    messages.insert(id, json.as_slice())?;
                    flipped += 1;
                }
            }
            flipped
        };
        write_txn.commit()?;
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;
    use tempfile::TempDir;

    fn test_db_with_user() -> (CredentialDb, TempDir, u64) {
        let dir = TempDir::new().unwrap();
        let db = CredentialDb::open(&dir.path().join("credentials.redb")).unwrap();
        let user = db
            .create_user("Alice", "alice@x.com", "hash", false, UserStatus::Pending)
            .unwrap();
        let id = user.id;
        (db, dir, id)
    }

    #[test]
    fn append_then_list_returns_exactly_one_unread_message() {
        let (db, _dir, user_id) = test_db_with_user();

        db.append_message(user_id, "hello", AuthorRole::User).unwrap();

        let rows = db.messages_for_user(user_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body, "hello");
        assert_eq!(rows[0].author, AuthorRole::User);
        assert!(!rows[0].is_read);

        let view = rows[0].to_view();
        assert!(!view.is_bot);
        assert_eq!(view.message, "hello");
    }

    #[test]
    fn conversation_is_ascending_and_scoped_to_user() {
        let (db, _dir, alice) = test_db_with_user();
        let bob = db
            .create_user("Bob", "bob@x.com", "hash", false, UserStatus::Pending)
            .unwrap()
            .id;

        db.append_message(alice, "first", AuthorRole::User).unwrap();
        db.append_message(bob, "other thread", AuthorRole::User).unwrap();
        db.append_message(alice, "second", AuthorRole::Bot).unwrap();
        db.append_message(alice, "third", AuthorRole::Admin).unwrap();

        let rows = db.messages_for_user(alice).unwrap();
        let bodies: Vec<_> = rows.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);

        // Bot and admin rows carry the compatibility flag; the user row not.
        assert!(!rows[0].to_view().is_bot);
        assert!(rows[1].to_view().is_bot);
        assert!(rows[2].to_view().is_bot);
    }

    #[test]
    fn all_messages_groups_by_user_id() {
        let (db, _dir, alice) = test_db_with_user();
        let bob = db
            .create_user("Bob", "bob@x.com", "hash", false, UserStatus::Pending)
            .unwrap()
            .id;

        db.append_message(bob, "from bob", AuthorRole::User).unwrap();
        db.append_message(alice, "from alice", AuthorRole::User).unwrap();

        let rows = db.all_messages().unwrap();
        assert_eq!(rows.len(), 2);
        // Ordered by user id, not by insertion time.
        assert_eq!(rows[0].user_id, alice);
        assert_eq!(rows[1].user_id, bob);
    }

    #[test]
    fn append_for_missing_user_fails() {
        let (db, _dir, _user) = test_db_with_user();
        let err = db.append_message(999, "hi", AuthorRole::User).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn mark_read_flips_only_user_authored_rows() {
        let (db, _dir, alice) = test_db_with_user();
        db.append_message(alice, "question", AuthorRole::User).unwrap();
        db.append_message(alice, "auto-ack", AuthorRole::Bot).unwrap();

        let flipped = db.mark_user_messages_read(alice).unwrap();
        assert_eq!(flipped, 1);

        let rows = db.messages_for_user(alice).unwrap();
        assert!(rows[0].is_read);
        assert!(!rows[1].is_read);

        // Idempotent on a second pass.
        assert_eq!(db.mark_user_messages_read(alice).unwrap(), 0);
    }
}
