// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User rows: registration insert, lifecycle transitions, admin listing.
//!
//! The email uniqueness check and the Pending→Approved/Rejected transitions
//! run inside single write transactions, so concurrent callers race at the
//! store and the loser gets a typed error.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::models::{BalanceSet, PublicUser, UserStatus, WalletAddress, WalletSet};

use super::database::{CredentialDb, StoreError, StoreResult, COUNTERS, EMAIL_INDEX, USERS};

/// User row as persisted.
///
/// Never serialized to a client; [`StoredUser::to_public`] strips the hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub status: UserStatus,
    pub wallets: WalletSet,
    pub balances: BalanceSet,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Approved
    }

    /// Public projection: everything except the password hash.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            is_approved: self.is_approved(),
            status: self.status,
            wallets: self.wallets.clone(),
            balances: self.balances.clone(),
            created_at: self.created_at,
        }
    }
}

fn decode_user(bytes: &[u8]) -> StoreResult<StoredUser> {
    Ok(serde_json::from_slice(bytes)?)
}

impl CredentialDb {
    /// Insert a new user row.
    ///
    /// The email is lowercased and checked against the uniqueness index in
    /// the same write transaction as the insert.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
        status: UserStatus,
    ) -> StoreResult<StoredUser> {
        let email = email.trim().to_lowercase();

        let write_txn = self.db.begin_write()?;
        let user = {
            let mut counters = write_txn.open_table(COUNTERS)?;
            let mut users = write_txn.open_table(USERS)?;
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;

            if email_index.get(email.as_str())?.is_some() {
                return Err(StoreError::EmailTaken(email));
            }

            let id = Self::next_id(&mut counters, "next_user_id")?;
            let user = StoredUser {
                id,
                name: name.trim().to_string(),
                email: email.clone(),
                password_hash: password_hash.to_string(),
                is_admin,
                status,
                wallets: WalletSet::default(),
                balances: BalanceSet::default(),
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&user)?;
            users.insert(id, json.as_slice())?;
            email_index.insert(email.as_str(), id)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Provision the admin account at startup if its email is unused.
    ///
    /// Admins are created Approved with a generated wallet address. Returns
    /// `None` when the account already exists (normal on restart).
    pub fn seed_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<StoredUser>> {
        match self.create_user(name, email, password_hash, true, UserStatus::Approved) {
            Ok(mut admin) => {
                let mut wallets = WalletSet::default();
                wallets.set(crate::models::Asset::Eth, WalletAddress::random());
                admin = self.assign_wallets(admin.id, &wallets)?;
                Ok(Some(admin))
            }
            Err(StoreError::EmailTaken(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up a user by id.
    pub fn get_user(&self, user_id: u64) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(user_id)? {
            Some(value) => Ok(Some(decode_user(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email (lowercased before the index probe).
    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let email = email.trim().to_lowercase();
        let read_txn = self.db.begin_read()?;
        let email_index = read_txn.open_table(EMAIL_INDEX)?;
        let Some(id) = email_index.get(email.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(decode_user(value.value())?)),
            None => Ok(None),
        }
    }

    /// All users, ascending by id (admin review view).
    pub fn list_users(&self) -> StoreResult<Vec<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;

        let mut rows = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            rows.push(decode_user(value.value())?);
        }
        Ok(rows)
    }

    /// Compare-and-set approval: Pending → Approved, writing the supplied
    /// wallet addresses.
    ///
    /// Re-approval is rejected, not repeated; a concurrent loser observes
    /// the committed Approved state and gets `InvalidState`.
    pub fn approve_user(&self, user_id: u64, wallets: &WalletSet) -> StoreResult<StoredUser> {
        self.update_user(user_id, |user| {
            match user.status {
                UserStatus::Pending => {}
                UserStatus::Approved => {
                    return Err(StoreError::InvalidState("User already approved".into()))
                }
                UserStatus::Rejected => {
                    return Err(StoreError::InvalidState("User has been rejected".into()))
                }
            }
            user.status = UserStatus::Approved;
            user.wallets.merge(wallets);
            Ok(())
        })
    }

    /// Terminal rejection: Pending → Rejected. The row remains but is
    /// excluded from any later approval.
    pub fn reject_user(&self, user_id: u64) -> StoreResult<StoredUser> {
        self.update_user(user_id, |user| {
            match user.status {
                UserStatus::Pending => {}
                UserStatus::Approved => {
                    return Err(StoreError::InvalidState("User already approved".into()))
                }
                UserStatus::Rejected => {
                    return Err(StoreError::InvalidState("User already rejected".into()))
                }
            }
            user.status = UserStatus::Rejected;
            Ok(())
        })
    }

    /// Overwrite wallet assignments without touching the lifecycle state.
    /// Used only by the admin seed.
    fn assign_wallets(&self, user_id: u64, wallets: &WalletSet) -> StoreResult<StoredUser> {
        self.update_user(user_id, |user| {
            user.wallets.merge(wallets);
            Ok(())
        })
    }

    /// Read-modify-write of one user row inside a single write transaction.
    fn update_user(
        &self,
        user_id: u64,
        mutate: impl FnOnce(&mut StoredUser) -> StoreResult<()>,
    ) -> StoreResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;

            let existing = users.get(user_id)?.map(|v| v.value().to_vec());
            let Some(bytes) = existing else {
                return Err(StoreError::NotFound(format!("User {user_id}")));
            };

            let mut user = decode_user(&bytes)?;
            mutate(&mut user)?;

            let json = serde_json::to_vec(&user)?;
            users.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }
}
