use std::collections::HashSet;

use crate::errors::MarketDataError;

/// Message returned for any malformed ticker list.
pub const INVALID_TICKERS_MESSAGE: &str = "Invalid tickers array";

/// A validated, non-empty batch of ticker symbols.
///
/// Order is the processing order. Symbols are kept exactly as given (no case
/// folding, no lookup against a symbol list); repeated symbols are collapsed to
/// their first occurrence so each key is fetched once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerBatch {
    tickers: Vec<String>,
}

impl TickerBatch {
    /// Build a batch, rejecting an empty list.
    pub fn new<I, S>(tickers: I) -> Result<Self, MarketDataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let tickers: Vec<String> = tickers
            .into_iter()
            .map(Into::into)
            .filter(|t| seen.insert(t.clone()))
            .collect();

        if tickers.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: INVALID_TICKERS_MESSAGE.to_string(),
            });
        }

        Ok(Self { tickers })
    }

    /// Build a batch from an untyped JSON value.
    ///
    /// Anything other than a non-empty array of strings is a validation error.
    pub fn from_json(value: Option<&serde_json::Value>) -> Result<Self, MarketDataError> {
        let invalid = || MarketDataError::ValidationFailed {
            message: INVALID_TICKERS_MESSAGE.to_string(),
        };

        let items = value.and_then(|v| v.as_array()).ok_or_else(invalid)?;
        let tickers = items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(invalid)?;

        Self::new(tickers)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tickers
    }
}
