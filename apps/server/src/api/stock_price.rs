use std::{collections::BTreeMap, sync::Arc};

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolhub_market_data::TickerBatch;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult, FETCH_FAILED_MESSAGE},
    main_lib::AppState,
};

/// Documented request shape. The handler parses the raw body itself, whatever
/// its content type, so that a malformed `tickers` field maps to a 400 rather
/// than a rejection.
#[derive(Deserialize, ToSchema)]
pub struct StockPriceRequest {
    pub tickers: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StockPriceResponse {
    /// One entry per requested ticker; `null` when no provider had a price.
    pub prices: BTreeMap<String, Option<f64>>,
}

#[utoipa::path(
    post,
    path = "/api/stock-price",
    request_body = StockPriceRequest,
    responses(
        (status = 200, body = StockPriceResponse),
        (status = 400, description = "Invalid tickers array"),
        (status = 500, description = "Failed to fetch stock prices")
    )
)]
pub async fn fetch_stock_prices(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<StockPriceResponse>> {
    let body: Value = serde_json::from_slice(&body).map_err(|e| ApiError::Internal {
        message: FETCH_FAILED_MESSAGE.to_string(),
        details: Some(e.to_string()),
    })?;
    let batch = TickerBatch::from_json(body.get("tickers"))?;

    tracing::info!("Fetching prices for {} tickers", batch.len());
    let report = state.fetcher.fetch_prices(&batch).await;
    if report.deadline_exceeded {
        tracing::warn!(
            "Price fetch deadline reached; {} tickers left unpriced",
            report.failure_count()
        );
    }

    Ok(Json(StockPriceResponse {
        prices: report.prices,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stock-price", post(fetch_stock_prices))
}
