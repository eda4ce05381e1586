//! Price refresh for open calls.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::model::LlmCall;
use crate::errors::{Error, Result};

/// Column patch for one call after a price refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceUpdate {
    pub id: i64,
    pub ticker: String,
    pub current_price: f64,
    pub last_price_update: DateTime<Utc>,
}

/// Unique tickers of the open calls, in first-seen order.
pub fn open_call_tickers(calls: &[LlmCall]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let tickers: Vec<String> = calls
        .iter()
        .filter(|c| c.is_open())
        .filter(|c| seen.insert(c.ticker.as_str()))
        .map(|c| c.ticker.clone())
        .collect();

    if tickers.is_empty() {
        return Err(Error::NoOpenPositions);
    }
    Ok(tickers)
}

/// Build one update per open call whose ticker resolved to a positive price.
///
/// Calls sharing a ticker all receive the same price. Tickers without a
/// price are left untouched.
pub fn price_updates<F>(calls: &[LlmCall], price_of: F, now: DateTime<Utc>) -> Vec<PriceUpdate>
where
    F: Fn(&str) -> Option<f64>,
{
    calls
        .iter()
        .filter(|c| c.is_open())
        .filter_map(|c| match price_of(&c.ticker) {
            Some(price) if price > 0.0 => Some(PriceUpdate {
                id: c.id,
                ticker: c.ticker.clone(),
                current_price: price,
                last_price_update: now,
            }),
            _ => {
                debug!("No refreshed price for call {} ({})", c.id, c.ticker);
                None
            }
        })
        .collect()
}

/// Validate a price typed in by hand.
pub fn parse_manual_price(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(Error::Validation("Please enter a valid price".to_string())),
    }
}
