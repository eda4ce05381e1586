//! Toolhub Market Data Crate
//!
//! This crate fetches best-effort latest prices for batches of ticker
//! symbols from rate-limited upstream quote providers.
//!
//! # Overview
//!
//! - A primary provider (Alpha Vantage, strict 5/min quota) used when a
//!   credential is configured
//! - A fallback provider (Yahoo Finance) used when the primary has no price,
//!   or as the sole source otherwise
//! - Strictly sequential processing with provider-specific pacing
//! - Upstream failures classified into a small fixed taxonomy
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   TickerBatch    |  (validated request)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   PriceFetcher   | --> |  PacingPolicy    |  (delays, batches, cooldown)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (AlphaVantage -> Yahoo)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |   FetchReport    |  (ticker -> price | null)
//! +------------------+
//! ```

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use errors::{ErrorKind, MarketDataError};
pub use fetcher::{
    FetchReport, FetcherConfig, PacingOverrides, PacingPolicy, PriceFetcher, ProviderConfig,
};
pub use models::{PriceQuote, PriceSource, ProviderId, TickerBatch, INVALID_TICKERS_MESSAGE};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, RateLimit};
