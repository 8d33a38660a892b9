// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! ## Response Envelope
//!
//! Every endpoint answers `{"success": bool, "data"?: ..., "message"?: ...}`.
//! Success responses go through [`ApiEnvelope`]; failures through
//! [`crate::error::ApiError`].
//!
//! ## Model Categories
//!
//! - **Assets & wallets**: the six supported assets and their per-user
//!   wallet/balance fields
//! - **Users**: public user rows (no password hash, ever)
//! - **Messages**: support-chat records with an explicit author role

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Response Envelope
// =============================================================================

/// Success envelope wrapping response payloads.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiEnvelope<T> {
    /// Always `true` for responses built through this type.
    pub success: bool,
    /// The payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable status message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Envelope carrying only data.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Envelope carrying data and a status message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiEnvelope<()> {
    /// Envelope carrying only a status message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Assets
// =============================================================================

/// Supported crypto assets.
///
/// Each user row carries one optional wallet address and one balance per
/// asset. The set is fixed; adding an asset is a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Btc,
    Eth,
    Bnb,
    Usdt,
    Xrp,
    Sol,
}

impl Asset {
    pub const ALL: [Asset; 6] = [
        Asset::Btc,
        Asset::Eth,
        Asset::Bnb,
        Asset::Usdt,
        Asset::Xrp,
        Asset::Sol,
    ];

    /// Uppercase ticker symbol, e.g. `BTC`.
    pub fn ticker(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
            Asset::Bnb => "BNB",
            Asset::Usdt => "USDT",
            Asset::Xrp => "XRP",
            Asset::Sol => "SOL",
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ticker())
    }
}

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Opaque per-asset wallet address assigned by an admin.
///
/// Not validated against any blockchain; the platform treats it as an
/// identifier string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Generate a random 0x-prefixed 40-hex-char address.
    ///
    /// Used only when seeding the admin account; admin-assigned user
    /// addresses arrive through the approval workflow.
    pub fn random() -> Self {
        const HEX: &[u8] = b"0123456789abcdef";
        let mut rng = rand::thread_rng();
        let mut address = String::with_capacity(42);
        address.push_str("0x");
        for _ in 0..40 {
            address.push(HEX[rng.gen_range(0..HEX.len())] as char);
        }
        WalletAddress(address)
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Per-Asset Wallet & Balance Sets
// =============================================================================

/// One optional wallet address per supported asset.
///
/// Serialized with the flat `<asset>_wallet` field names the clients expect.
/// All addresses are `null` until an admin assigns them during approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WalletSet {
    #[serde(rename = "btc_wallet", default)]
    pub btc: Option<WalletAddress>,
    #[serde(rename = "eth_wallet", default)]
    pub eth: Option<WalletAddress>,
    #[serde(rename = "bnb_wallet", default)]
    pub bnb: Option<WalletAddress>,
    #[serde(rename = "usdt_wallet", default)]
    pub usdt: Option<WalletAddress>,
    #[serde(rename = "xrp_wallet", default)]
    pub xrp: Option<WalletAddress>,
    #[serde(rename = "sol_wallet", default)]
    pub sol: Option<WalletAddress>,
}

impl WalletSet {
    pub fn get(&self, asset: Asset) -> Option<&WalletAddress> {
        match asset {
            Asset::Btc => self.btc.as_ref(),
            Asset::Eth => self.eth.as_ref(),
            Asset::Bnb => self.bnb.as_ref(),
            Asset::Usdt => self.usdt.as_ref(),
            Asset::Xrp => self.xrp.as_ref(),
            Asset::Sol => self.sol.as_ref(),
        }
    }

    pub fn set(&mut self, asset: Asset, address: WalletAddress) {
        let slot = match asset {
            Asset::Btc => &mut self.btc,
            Asset::Eth => &mut self.eth,
            Asset::Bnb => &mut self.bnb,
            Asset::Usdt => &mut self.usdt,
            Asset::Xrp => &mut self.xrp,
            Asset::Sol => &mut self.sol,
        };
        *slot = Some(address);
    }

    /// True when no asset has an assigned address.
    pub fn is_empty(&self) -> bool {
        Asset::ALL.iter().all(|asset| self.get(*asset).is_none())
    }

    /// Overlay every assigned address of `other` onto `self`.
    ///
    /// Addresses absent from `other` are left untouched.
    pub fn merge(&mut self, other: &WalletSet) {
        for asset in Asset::ALL {
            if let Some(address) = other.get(asset) {
                self.set(asset, address.clone());
            }
        }
    }
}

/// One balance per supported asset, zeroed by default.
///
/// Serialized with the flat `<asset>_balance` field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BalanceSet {
    #[serde(rename = "btc_balance", default)]
    pub btc: f64,
    #[serde(rename = "eth_balance", default)]
    pub eth: f64,
    #[serde(rename = "bnb_balance", default)]
    pub bnb: f64,
    #[serde(rename = "usdt_balance", default)]
    pub usdt: f64,
    #[serde(rename = "xrp_balance", default)]
    pub xrp: f64,
    #[serde(rename = "sol_balance", default)]
    pub sol: f64,
}

impl BalanceSet {
    pub fn get(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Btc => self.btc,
            Asset::Eth => self.eth,
            Asset::Bnb => self.bnb,
            Asset::Usdt => self.usdt,
            Asset::Xrp => self.xrp,
            Asset::Sol => self.sol,
        }
    }
}

// =============================================================================
// User Models
// =============================================================================

/// User lifecycle state.
///
/// `Pending` rows have no wallet addresses and zero balances. `Rejected` is
/// terminal: the row remains but can never be approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

/// Public view of a user row.
///
/// This is the only user shape that crosses the API boundary; the password
/// hash lives exclusively in the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    /// Derived from `status`; kept for clients that read a boolean.
    pub is_approved: bool,
    pub status: UserStatus,
    #[serde(flatten)]
    pub wallets: WalletSet,
    #[serde(flatten)]
    pub balances: BalanceSet,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /api/admin/approve-user`.
///
/// Wallet fields are flattened: `{"userId": 3, "eth_wallet": "0x...", ...}`.
/// Omitted or null addresses are left unassigned.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApproveUserRequest {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(flatten)]
    pub wallets: WalletSet,
}

/// Request body for `POST /api/admin/reject-user`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RejectUserRequest {
    #[serde(rename = "userId")]
    pub user_id: u64,
}

// =============================================================================
// Message Models
// =============================================================================

/// Who authored a support message.
///
/// An explicit role instead of a lone `is_bot` flag, which would conflate
/// "automated" with "not the requesting user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    User,
    Bot,
    Admin,
}

/// Public view of a support-chat message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageView {
    pub id: u64,
    pub user_id: u64,
    pub message: String,
    pub author: AuthorRole,
    /// Compatibility field: `true` for bot and admin messages, so existing
    /// chat clients render them on the staff side.
    pub is_bot: bool,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/messages`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(default)]
    pub message: String,
    /// When set, the message is recorded as an automated bot reply.
    #[serde(rename = "isBot", default)]
    pub is_bot: bool,
}

/// Request body for `POST /api/admin/reply`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplyRequest {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_from_and_into_string() {
        let from_str: WalletAddress = "abc".into();
        assert_eq!(from_str.0, "abc");

        let from_string: WalletAddress = String::from("def").into();
        assert_eq!(from_string.0, "def");

        let to_string: String = WalletAddress("ghi".into()).into();
        assert_eq!(to_string, "ghi");
    }

    #[test]
    fn random_wallet_address_shape() {
        let addr = WalletAddress::random();
        assert!(addr.0.starts_with("0x"));
        assert_eq!(addr.0.len(), 42);
        assert!(addr.0[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn wallet_set_merge_leaves_omitted_assets() {
        let mut base = WalletSet::default();
        base.set(Asset::Btc, "0xaaa".into());

        let mut incoming = WalletSet::default();
        incoming.set(Asset::Eth, "0xbbb".into());

        base.merge(&incoming);
        assert_eq!(base.get(Asset::Btc), Some(&"0xaaa".into()));
        assert_eq!(base.get(Asset::Eth), Some(&"0xbbb".into()));
        assert_eq!(base.get(Asset::Sol), None);
    }

    #[test]
    fn wallet_set_serializes_flat_field_names() {
        let mut wallets = WalletSet::default();
        wallets.set(Asset::Eth, "0xdead".into());

        let json = serde_json::to_value(&wallets).unwrap();
        assert_eq!(json["eth_wallet"], "0xdead");
        assert!(json["btc_wallet"].is_null());
    }

    #[test]
    fn approve_request_parses_flattened_wallets() {
        let body = r#"{"userId": 7, "eth_wallet": "0xdead", "btc_wallet": null}"#;
        let req: ApproveUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.user_id, 7);
        assert_eq!(req.wallets.get(Asset::Eth), Some(&"0xdead".into()));
        assert_eq!(req.wallets.get(Asset::Btc), None);
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let env = ApiEnvelope::data(42u32);
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);

        let env = ApiEnvelope::message("done");
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"done"}"#);
    }
}
