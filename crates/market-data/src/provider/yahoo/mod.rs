//! Yahoo Finance market data provider.
//!
//! Used as the fallback quote source. It has no published quota, but
//! throttling (HTTP 429) is observed in practice and is surfaced by the
//! client library only as error text.

use async_trait::async_trait;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;
use crate::provider::{MarketDataProvider, RateLimit};

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Map a client library error into the crate taxonomy.
    fn classify_error(symbol: &str, error: &yahoo::YahooError) -> MarketDataError {
        if matches!(error, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
            return MarketDataError::SymbolNotFound(symbol.to_string());
        }
        MarketDataError::from_upstream_message(PROVIDER_ID, error.to_string())
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(60)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| Self::classify_error(symbol, &e))?;

        let last = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.to_string())
        })?;

        if !PriceQuote::is_usable_price(last.close) {
            return Err(MarketDataError::NoPrice {
                provider: PROVIDER_ID.to_string(),
                symbol: symbol.to_string(),
            });
        }

        debug!("Yahoo: {} last traded at {}", symbol, last.close);

        Ok(PriceQuote::new(symbol, last.close, PROVIDER_ID))
    }
}
