//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`ErrorKind`]: The small fixed taxonomy the fetcher acts on

mod kind;

pub use kind::ErrorKind;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into an [`ErrorKind`] via the [`kind`](Self::kind)
/// method, which determines how the price fetcher reacts to the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered, but the answer carried no usable price.
    #[error("No price from {provider} for {symbol}")]
    NoPrice {
        /// The provider that was asked
        provider: String,
        /// The symbol that was requested
        symbol: String,
    },

    /// The provider rate limited the request (HTTP 429 or an equivalent notice).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The request itself is malformed. No provider is contacted.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },
}

impl MarketDataError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolhub_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.kind(), ErrorKind::RateLimited);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.kind(), ErrorKind::NoData);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed { .. } => ErrorKind::Validation,

            Self::RateLimited { .. } => ErrorKind::RateLimited,

            Self::SymbolNotFound(_) | Self::NoPrice { .. } => ErrorKind::NoData,

            Self::Timeout { .. } | Self::ProviderError { .. } => ErrorKind::ProviderUnavailable,
        }
    }

    /// Returns true if the upstream signalled throttling.
    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimited
    }

    /// Classify a non-success HTTP status returned by a provider.
    pub fn from_status(provider: &str, status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: format!("HTTP {}", status),
            }
        }
    }

    /// Classify a free-form error message raised by a provider or its client library.
    ///
    /// Quote libraries surface throttling only as text, e.g.
    /// `"HTTP 429"` or `"Too Many Requests"`.
    pub fn from_upstream_message(provider: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            Self::RateLimited {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message,
            }
        }
    }
}

/// Returns true if the message carries a throttling signal.
pub(crate) fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.to_ascii_lowercase().contains("too many requests")
}
