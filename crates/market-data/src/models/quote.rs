use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::ProviderId;

/// Latest traded price returned by a provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Symbol exactly as it was requested
    pub symbol: String,

    /// Last traded price, always finite and positive
    pub price: f64,

    /// Provider that produced the price (YAHOO, ALPHA_VANTAGE, etc.)
    pub source: ProviderId,

    /// When the price was obtained
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Create a quote stamped with the current time.
    pub fn new(symbol: impl Into<String>, price: f64, source: &'static str) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            source: ProviderId::Borrowed(source),
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if the value can be used as a market price.
    pub fn is_usable_price(price: f64) -> bool {
        price.is_finite() && price > 0.0
    }
}

/// Which side of the provider cascade resolved a ticker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Primary,
    Fallback,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Primary => write!(f, "primary"),
            PriceSource::Fallback => write!(f, "fallback"),
        }
    }
}
