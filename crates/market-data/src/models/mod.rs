//! Market data models
//!
//! This module contains the core data types for price fetching:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `quote` - A single provider answer (PriceQuote) and its source label
//! - `ticker` - The validated batch of ticker symbols (TickerBatch)

mod quote;
mod ticker;
mod types;

pub use quote::{PriceQuote, PriceSource};
pub use ticker::{TickerBatch, INVALID_TICKERS_MESSAGE};
pub use types::ProviderId;
