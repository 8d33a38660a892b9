// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coinvest - Crypto Investment Platform Backend
//!
//! This crate provides the REST backend for the investment platform:
//! registration with admin review, per-asset wallet assignment on approval,
//! a support-chat message log and market spot prices.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens, password hashing, authorization extractors
//! - `storage` - Embedded credential store (redb)
//! - `market` - Upstream spot-price client

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod market;
pub mod models;
pub mod state;
pub mod storage;
