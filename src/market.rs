// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Market data client.
//!
//! Fetches spot prices for the supported assets from a CoinGecko-compatible
//! `/simple/price` endpoint. Prices are informational; nothing in the
//! approval or messaging flow depends on them.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config;
use crate::models::Asset;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Market data errors.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("market request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market response missing price for {0}")]
    MissingPrice(Asset),
}

/// Spot price of one asset in USD.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetPrice {
    /// Asset ticker, e.g. "BTC"
    pub asset: String,
    /// Price in USD
    pub usd: f64,
}

/// Client for the upstream price API.
pub struct MarketClient {
    http: reqwest::Client,
    base_url: String,
}

/// CoinGecko id for an asset.
fn coingecko_id(asset: Asset) -> &'static str {
    match asset {
        Asset::Btc => "bitcoin",
        Asset::Eth => "ethereum",
        Asset::Bnb => "binancecoin",
        Asset::Usdt => "tether",
        Asset::Xrp => "ripple",
        Asset::Sol => "solana",
    }
}

impl MarketClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build a client from `MARKET_API_URL`, falling back to CoinGecko.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(config::MARKET_API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    /// Fetch USD spot prices for every supported asset.
    pub async fn fetch_prices(&self) -> Result<Vec<AssetPrice>, MarketError> {
        let ids = Asset::ALL
            .iter()
            .map(|a| coingecko_id(*a))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?;

        let raw: HashMap<String, HashMap<String, f64>> = response.json().await?;
        parse_prices(&raw)
    }
}

/// Map a `/simple/price` response onto the supported asset list, preserving
/// the canonical asset order.
fn parse_prices(
    raw: &HashMap<String, HashMap<String, f64>>,
) -> Result<Vec<AssetPrice>, MarketError> {
    Asset::ALL
        .iter()
        .map(|&asset| {
            let usd = raw
                .get(coingecko_id(asset))
                .and_then(|quotes| quotes.get("usd"))
                .copied()
                .ok_or(MarketError::MissingPrice(asset))?;
            Ok(AssetPrice {
                asset: asset.ticker().to_string(),
                usd,
            })
        })
        .collect()
}
