// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Market data endpoint.

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::market::AssetPrice;
use crate::models::ApiEnvelope;
use crate::state::AppState;

/// Current USD spot prices for the supported assets.
#[utoipa::path(
    get,
    path = "/api/market/prices",
    tag = "market",
    responses(
        (status = 200, description = "Spot prices in canonical asset order", body = [AssetPrice]),
        (status = 503, description = "Upstream price API unreachable"),
    )
)]
pub async fn prices(
    State(state): State<AppState>,
) -> Result<Json<ApiEnvelope<Vec<AssetPrice>>>, ApiError> {
    let prices = state.market().fetch_prices().await.map_err(|e| {
        tracing::warn!(error = %e, "price fetch failed");
        ApiError::unavailable("Market data temporarily unavailable")
    })?;
    Ok(Json(ApiEnvelope::data(prices)))
}
