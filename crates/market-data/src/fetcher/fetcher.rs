//! Price fetcher orchestrating the primary and fallback providers.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{sleep_until, timeout_at, Instant};

use super::config::{FetcherConfig, PacingPolicy, ProviderConfig};
use super::report::FetchReport;
use crate::errors::{ErrorKind, MarketDataError};
use crate::models::{PriceQuote, PriceSource, TickerBatch};
use crate::provider::MarketDataProvider;

/// Terminal state of a single ticker.
enum TickerOutcome {
    Priced(PriceQuote, PriceSource),
    Unpriced,
    /// The fallback provider throttled us; the next ticker must wait longer.
    RateLimited,
}

/// Sequential, rate-limit aware price fetcher.
///
/// Holds no per-request state, so one instance can be shared behind an `Arc`.
/// Each call to [`fetch_prices`](Self::fetch_prices) runs in the caller's
/// task and never issues two provider calls at once.
pub struct PriceFetcher {
    primary: Option<Arc<dyn MarketDataProvider>>,
    fallback: Arc<dyn MarketDataProvider>,
    config: FetcherConfig,
}

impl PriceFetcher {
    /// Create a fetcher.
    ///
    /// `primary` is `None` when no credential for it is configured; the
    /// fallback provider then becomes the sole source.
    pub fn new(
        primary: Option<Arc<dyn MarketDataProvider>>,
        fallback: Arc<dyn MarketDataProvider>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            config,
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            primary_configured: self.primary.is_some(),
        }
    }

    /// Pacing in effect for the configured provider ordering.
    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy::derive(self.provider_config(), &self.config.pacing)
    }

    /// Validate a raw ticker list and fetch prices for it.
    ///
    /// Fails only when the list is empty; no provider is contacted then.
    pub async fn fetch<I, S>(&self, tickers: I) -> Result<FetchReport, MarketDataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch = TickerBatch::new(tickers)?;
        Ok(self.fetch_prices(&batch).await)
    }

    /// Fetch a price (or null) for every ticker of the batch.
    pub async fn fetch_prices(&self, batch: &TickerBatch) -> FetchReport {
        let start = Instant::now();
        let deadline_at = self.config.deadline.map(|deadline| start + deadline);
        let pacing = self.pacing();
        let total = batch.len();

        info!("=== Price fetch started ===");
        match &self.primary {
            Some(primary) => info!(
                "Processing {} tickers using {} ({}), falling back to {}",
                total,
                primary.id(),
                primary.rate_limit(),
                self.fallback.id()
            ),
            None => {
                info!("Processing {} tickers using {}", total, self.fallback.id());
                warn!(
                    "No primary provider credential configured. Using {} only (may hit rate limits).",
                    self.fallback.id()
                );
            }
        }
        debug!(
            "Pacing: {:?} between requests, {:?} after every {} tickers, about {:?} in total",
            pacing.request_delay,
            pacing.batch_delay,
            pacing.batch_size,
            pacing.estimated_duration(total)
        );

        let mut report = FetchReport::default();

        for (index, ticker) in batch.iter().enumerate() {
            let position = index + 1;

            if report.deadline_exceeded || deadline_at.is_some_and(|at| Instant::now() >= at) {
                if !report.deadline_exceeded {
                    warn!(
                        "Fetch deadline reached after {:?}; {} tickers left unpriced",
                        start.elapsed(),
                        total - index
                    );
                    report.deadline_exceeded = true;
                }
                report.record(ticker, None, None);
                continue;
            }

            info!("[{}/{}] Fetching {}...", position, total, ticker);

            let outcome = match deadline_at {
                Some(at) => match timeout_at(at, self.resolve(ticker)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(
                            "  {}: Fetch deadline reached mid-request; {} tickers left unpriced",
                            ticker,
                            total - index
                        );
                        report.deadline_exceeded = true;
                        report.record(ticker, None, None);
                        continue;
                    }
                },
                None => self.resolve(ticker).await,
            };

            match outcome {
                TickerOutcome::Priced(quote, source) => {
                    info!(
                        "  {}: ${:.2} ({}, {})",
                        ticker, quote.price, quote.source, source
                    );
                    report.record(ticker, Some(quote.price), Some(source));
                }
                TickerOutcome::Unpriced => {
                    warn!("  {}: No price data available from any source", ticker);
                    report.record(ticker, None, None);
                }
                TickerOutcome::RateLimited => {
                    report.record(ticker, None, None);
                    report.rate_limited.push(ticker.to_string());
                    warn!(
                        "  {}: Rate limit hit. Waiting {:?}...",
                        ticker, pacing.rate_limit_cooldown
                    );
                    pause(pacing.rate_limit_cooldown, deadline_at).await;
                }
            }

            if let Some(delay) = pacing.delay_after(position, total) {
                if position % pacing.batch_size == 0 && !pacing.batch_delay.is_zero() {
                    info!(
                        "  Pausing {:?} after batch of {}...",
                        delay, pacing.batch_size
                    );
                }
                pause(delay, deadline_at).await;
            }
        }

        report.elapsed = start.elapsed();

        info!("=== Price fetch completed ===");
        info!("Total time: {:.1}s", report.elapsed.as_secs_f64());
        info!("Success: {}/{}", report.success_count(), total);
        info!("Failures: {}/{}", report.failure_count(), total);
        info!("Success rate: {:.1}%", report.success_rate());

        report
    }

    /// Run the provider cascade for one ticker. Never fails.
    async fn resolve(&self, ticker: &str) -> TickerOutcome {
        if let Some(primary) = &self.primary {
            match primary.get_latest_price(ticker).await {
                Ok(quote) => return TickerOutcome::Priced(quote, PriceSource::Primary),
                Err(e) => self.log_primary_failure(primary.id(), ticker, &e),
            }
        }

        match self.fallback.get_latest_price(ticker).await {
            Ok(quote) => TickerOutcome::Priced(quote, PriceSource::Fallback),
            Err(e) if e.is_rate_limited() => {
                error!("  {}: {} rate limited", ticker, self.fallback.id());
                TickerOutcome::RateLimited
            }
            Err(e) => {
                let provider = self.fallback.id();
                match e.kind() {
                    ErrorKind::NoData => debug!("  {}: {} has no price: {}", ticker, provider, e),
                    _ => error!("  {}: {} error - {}", ticker, provider, e),
                }
                TickerOutcome::Unpriced
            }
        }
    }

    fn log_primary_failure(&self, primary_id: &str, ticker: &str, error: &MarketDataError) {
        match error.kind() {
            ErrorKind::RateLimited => warn!(
                "  {}: {} rate limited, trying {}...",
                ticker,
                primary_id,
                self.fallback.id()
            ),
            _ => info!(
                "  {}: {} failed ({}), trying {}...",
                ticker,
                primary_id,
                error,
                self.fallback.id()
            ),
        }
    }
}

/// Sleep for `duration`, waking no later than the fetch deadline.
async fn pause(duration: Duration, deadline_at: Option<Instant>) {
    let wake = Instant::now() + duration;
    sleep_until(deadline_at.map_or(wake, |at| wake.min(at))).await;
}
