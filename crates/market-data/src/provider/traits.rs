//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! quote sources must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;

use super::capabilities::RateLimit;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new quote source. The fetcher
/// calls at most one method per ticker and never concurrently.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use toolhub_market_data::provider::{MarketDataProvider, RateLimit};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn rate_limit(&self) -> RateLimit {
///         RateLimit::per_minute(30)
///     }
///
///     // ... implement get_latest_price
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "ALPHA_VANTAGE", etc.
    /// Used for logging and as the source label of a quote.
    fn id(&self) -> &'static str;

    /// Quota this provider is known to enforce.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch the latest traded price for a symbol.
    ///
    /// # Returns
    ///
    /// A quote with a finite, positive price, or a `MarketDataError`
    /// classified through [`MarketDataError::kind`]. An answer without a
    /// usable price is an error (`NoPrice` / `SymbolNotFound`), never a quote.
    async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError>;
}
