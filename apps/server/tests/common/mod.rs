#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use toolhub_market_data::{
    FetcherConfig, MarketDataError, MarketDataProvider, PacingOverrides, PriceFetcher, PriceQuote,
    RateLimit,
};
use toolhub_server::{api::app_router, config::Config, AppState};
use tower::ServiceExt;

/// Provider answering from a fixed table. Unknown symbols have no price.
pub struct TableProvider {
    id: &'static str,
    prices: HashMap<String, f64>,
    pub calls: AtomicUsize,
}

impl TableProvider {
    pub fn new(id: &'static str, prices: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            id,
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for TableProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.prices.get(symbol) {
            Some(price) => Ok(PriceQuote::new(symbol, *price, self.id)),
            None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
        }
    }
}

pub fn no_pacing() -> FetcherConfig {
    FetcherConfig {
        pacing: PacingOverrides {
            request_delay: Some(Duration::ZERO),
            batch_delay: Some(Duration::ZERO),
            batch_size: None,
            rate_limit_cooldown: Some(Duration::ZERO),
        },
        deadline: None,
    }
}

pub fn test_router(
    primary: Option<Arc<TableProvider>>,
    fallback: Arc<TableProvider>,
) -> Router {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.fetcher = no_pacing();
    configured_router(primary, fallback, &config)
}

/// Router whose fetcher runs with the pacing and deadline of `config`.
pub fn configured_router(
    primary: Option<Arc<TableProvider>>,
    fallback: Arc<TableProvider>,
    config: &Config,
) -> Router {
    let primary = primary.map(|p| p as Arc<dyn MarketDataProvider>);
    let fetcher = PriceFetcher::new(primary, fallback, config.fetcher.clone());
    app_router(AppState::new(fetcher), config)
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    post(app, uri, body, Some("application/json")).await
}

pub async fn post(
    app: Router,
    uri: &str,
    body: &str,
    content_type: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = app
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
