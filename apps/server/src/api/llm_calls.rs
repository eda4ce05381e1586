use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use toolhub_core::llm_calls::{
    open_call_tickers, parse_manual_price, price_updates, summarize, DashboardSummary, LlmCall,
    PriceUpdate, StatusFilter,
};
use toolhub_market_data::TickerBatch;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
pub struct CallsRequest {
    pub calls: Vec<LlmCall>,
}

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub calls: Vec<LlmCall>,
    /// `all`, `open` or `closed`; absent lists every call.
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub updates: Vec<PriceUpdate>,
    pub prices: BTreeMap<String, Option<f64>>,
}

/// Hand-entered price; the dashboard sends the raw input text, scripts may send a number.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
pub struct ManualPriceRequest {
    pub ticker: String,
    pub price: PriceInput,
}

#[utoipa::path(
    post,
    path = "/api/llm-calls/summary",
    responses((status = 200, description = "Parsed calls with P&L, holding days and dashboard stats"))
)]
pub async fn summary(Json(body): Json<SummaryRequest>) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(summarize(body.calls, body.status, Utc::now())))
}

#[utoipa::path(
    post,
    path = "/api/llm-calls/refresh-prices",
    responses(
        (status = 200, description = "Price updates for the open calls"),
        (status = 400, description = "No open positions to update")
    )
)]
pub async fn refresh_prices(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CallsRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let tickers = open_call_tickers(&body.calls)?;
    let batch = TickerBatch::new(tickers)?;

    let report = state.fetcher.fetch_prices(&batch).await;
    let updates = price_updates(&body.calls, |ticker| report.price(ticker), Utc::now());
    tracing::info!(
        "Refreshed {} of {} open calls ({} tickers priced)",
        updates.len(),
        body.calls.iter().filter(|c| c.is_open()).count(),
        report.success_count()
    );

    Ok(Json(RefreshResponse {
        updates,
        prices: report.prices,
    }))
}

#[utoipa::path(
    post,
    path = "/api/llm-calls/{id}/price",
    params(("id" = i64, Path, description = "Call id")),
    responses(
        (status = 200, description = "Price update for the call"),
        (status = 400, description = "Please enter a valid price")
    )
)]
pub async fn set_manual_price(
    Path(id): Path<i64>,
    Json(body): Json<ManualPriceRequest>,
) -> ApiResult<Json<PriceUpdate>> {
    let current_price = match body.price {
        PriceInput::Number(n) => parse_manual_price(&n.to_string())?,
        PriceInput::Text(text) => parse_manual_price(&text)?,
    };

    Ok(Json(PriceUpdate {
        id,
        ticker: body.ticker,
        current_price,
        last_price_update: Utc::now(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm-calls/summary", post(summary))
        .route("/llm-calls/refresh-prices", post(refresh_prices))
        .route("/llm-calls/{id}/price", post(set_manual_price))
}
