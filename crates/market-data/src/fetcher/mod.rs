//! Sequential multi-source price fetching.
//!
//! The fetcher walks a [`TickerBatch`](crate::models::TickerBatch) one ticker
//! at a time, asking the primary provider first (when one is configured) and
//! the fallback provider second, and spaces calls according to a
//! [`PacingPolicy`] so neither provider's quota is exceeded.
//!
//! ```text
//! START -> primary? -- ok --------------------------> DONE(price, primary)
//!             |
//!             +-- failed / rate limited / absent
//!             v
//!          fallback -- ok --------------------------> DONE(price, fallback)
//!             |
//!             +-- rate limited -> extra cooldown ----> DONE(null)
//!             +-- anything else --------------------> DONE(null)
//! ```
//!
//! Per-ticker failures never escape the loop; only request validation fails
//! the call as a whole.

mod config;
mod fetcher;
mod report;

#[cfg(test)]
mod fetcher_tests;

pub use config::{FetcherConfig, PacingOverrides, PacingPolicy, ProviderConfig};
pub use fetcher::PriceFetcher;
pub use report::FetchReport;
