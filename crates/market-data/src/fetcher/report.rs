use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::models::PriceSource;

/// Outcome of one fetch request.
///
/// `prices` holds exactly one entry per requested ticker; `None` marks a
/// ticker no provider could price.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FetchReport {
    pub prices: BTreeMap<String, Option<f64>>,
    /// Which provider priced each resolved ticker.
    pub sources: BTreeMap<String, PriceSource>,
    /// Tickers whose fallback attempt was throttled.
    pub rate_limited: Vec<String>,
    /// Whether the overall deadline cut the batch short.
    pub deadline_exceeded: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl FetchReport {
    pub(crate) fn record(&mut self, ticker: &str, price: Option<f64>, source: Option<PriceSource>) {
        self.prices.insert(ticker.to_string(), price);
        if let Some(source) = source {
            self.sources.insert(ticker.to_string(), source);
        }
    }

    pub fn success_count(&self) -> usize {
        self.prices.values().filter(|p| p.is_some()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.prices.len() - self.success_count()
    }

    /// Share of tickers that resolved, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.prices.is_empty() {
            return 0.0;
        }
        self.success_count() as f64 / self.prices.len() as f64 * 100.0
    }

    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied().flatten()
    }
}
