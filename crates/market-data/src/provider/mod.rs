//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider rate limiting metadata
//! - Concrete provider implementations (Alpha Vantage, Yahoo)
//!
//! Providers answer one symbol at a time. Ordering, pacing and fallback are
//! the fetcher's job, not the provider's.

mod capabilities;
mod traits;

pub mod alpha_vantage;
pub mod yahoo;

// Re-exports
pub use capabilities::RateLimit;
pub use traits::MarketDataProvider;
