//! Alpha Vantage market data provider implementation.
//!
//! Latest prices come from the `GLOBAL_QUOTE` endpoint.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute
//! and 500 per day.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;
use crate::provider::{MarketDataProvider, RateLimit};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Field of the `Global Quote` object holding the last traded price.
const PRICE_FIELD: &str = "05. price";

/// Alpha Vantage market data provider.
///
/// Free tier is limited to 5 API calls per minute.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string().replace(&self.api_key, "***"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::from_status(PROVIDER_ID, status));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string().replace(&self.api_key, "***"),
            })
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        symbol: &str,
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            warn!("Alpha Vantage error for {}: {}", symbol, msg);
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        // "Note" and "Information" carry quota notices
        for msg in [note, information].into_iter().flatten() {
            warn!("Alpha Vantage notice for {}: {}", symbol, msg);
            if Self::is_quota_notice(msg) {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
        }

        Ok(())
    }

    fn is_quota_notice(msg: &str) -> bool {
        let lower = msg.to_ascii_lowercase();
        lower.contains("call frequency") || lower.contains("rate limit")
    }

    /// Parse a GLOBAL_QUOTE body into a usable price.
    fn parse_global_quote(symbol: &str, text: &str) -> Result<f64, MarketDataError> {
        let response: GlobalQuoteResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if let Some(price) = response
            .global_quote
            .as_ref()
            .and_then(|quote| quote.get(PRICE_FIELD))
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|price| PriceQuote::is_usable_price(*price))
        {
            return Ok(price);
        }

        Self::check_api_error(
            symbol,
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        Err(MarketDataError::NoPrice {
            provider: PROVIDER_ID.to_string(),
            symbol: symbol.to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(5).with_daily_limit(500)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];

        let text = self.fetch(&params).await?;
        let price = Self::parse_global_quote(symbol, &text)?;

        debug!("Alpha Vantage: {} last traded at {}", symbol, price);

        Ok(PriceQuote::new(symbol, price, PROVIDER_ID))
    }
}
