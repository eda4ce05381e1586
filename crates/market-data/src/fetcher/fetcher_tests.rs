//! Tests for the sequential provider cascade and its pacing.
//!
//! All tests run on a paused tokio clock, so `sleep` advances virtual time
//! instantly and elapsed time equals the sum of the pauses taken.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{FetcherConfig, PacingOverrides, PriceFetcher};
use crate::errors::{ErrorKind, MarketDataError};
use crate::models::{PriceQuote, PriceSource, TickerBatch};
use crate::provider::{MarketDataProvider, RateLimit};

// =========================================================================
// Mock provider
// =========================================================================

#[derive(Clone, Debug)]
enum Answer {
    Price(f64),
    NoPrice,
    RateLimited,
    Fail(&'static str),
}

struct MockProvider {
    id: &'static str,
    answers: HashMap<String, Answer>,
    default: Answer,
    latency: Duration,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    fn new(id: &'static str, default: Answer) -> Self {
        Self {
            id,
            answers: HashMap::new(),
            default,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn answer(mut self, symbol: &str, answer: Answer) -> Self {
        self.answers.insert(symbol.to_string(), answer);
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(symbol.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let answer = self.answers.get(symbol).unwrap_or(&self.default).clone();
        match answer {
            Answer::Price(price) => Ok(PriceQuote::new(symbol, price, self.id)),
            Answer::NoPrice => Err(MarketDataError::NoPrice {
                provider: self.id.to_string(),
                symbol: symbol.to_string(),
            }),
            Answer::RateLimited => Err(MarketDataError::from_upstream_message(
                self.id,
                "Too Many Requests",
            )),
            Answer::Fail(message) => Err(MarketDataError::ProviderError {
                provider: self.id.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

fn fetcher(
    primary: Option<&Arc<MockProvider>>,
    fallback: &Arc<MockProvider>,
    config: FetcherConfig,
) -> PriceFetcher {
    let primary = primary.map(|p| p.clone() as Arc<dyn MarketDataProvider>);
    PriceFetcher::new(primary, fallback.clone(), config)
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn tickers(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("T{i:02}")).collect()
}

// =========================================================================
// Contract
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_key_set_matches_input_for_any_size() {
    for n in [1, 2, 7, 12] {
        let fallback = Arc::new(
            MockProvider::new("FALLBACK", Answer::Price(10.0))
                .answer("T01", Answer::NoPrice)
                .answer("T03", Answer::Fail("boom"))
                .answer("T05", Answer::RateLimited),
        );
        let fetcher = fetcher(None, &fallback, FetcherConfig::default());

        let input = tickers(n);
        let report = fetcher.fetch(input.clone()).await.unwrap();

        let keys: Vec<String> = report.prices.keys().cloned().collect();
        let mut expected = input.clone();
        expected.sort();
        assert_eq!(keys, expected, "n = {n}");
        assert_eq!(fallback.call_count(), n);
    }
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_is_rejected_without_provider_calls() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::Price(1.0)));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(1.0)));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let err = fetcher.fetch(Vec::<String>::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(primary.call_count(), 0);
    assert_eq!(fallback.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_only_mode_uses_fallback_for_every_ticker() {
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(42.0)));
    let fetcher = fetcher(None, &fallback, FetcherConfig::default());
    assert!(!fetcher.provider_config().primary_configured);

    let report = fetcher.fetch(["AAPL", "MSFT", "NVDA"]).await.unwrap();

    assert_eq!(fallback.calls(), vec!["AAPL", "MSFT", "NVDA"]);
    assert!(report
        .sources
        .values()
        .all(|source| *source == PriceSource::Fallback));
}

#[tokio::test(start_paused = true)]
async fn test_primary_success_skips_fallback() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::Price(150.25)));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(1.0)));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let report = fetcher.fetch(["AAPL", "MSFT"]).await.unwrap();

    assert_eq!(primary.call_count(), 2);
    assert_eq!(fallback.call_count(), 0);
    assert_eq!(report.price("AAPL"), Some(150.25));
    assert_eq!(report.sources.get("MSFT"), Some(&PriceSource::Primary));
}

#[tokio::test(start_paused = true)]
async fn test_primary_without_price_falls_back_exactly_once() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::NoPrice));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(310.5)));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let report = fetcher.fetch(["MSFT"]).await.unwrap();

    assert_eq!(primary.calls(), vec!["MSFT"]);
    assert_eq!(fallback.calls(), vec!["MSFT"]);
    assert_eq!(report.price("MSFT"), Some(310.5));
    assert_eq!(report.sources.get("MSFT"), Some(&PriceSource::Fallback));
}

#[tokio::test(start_paused = true)]
async fn test_primary_rate_limit_falls_back_without_cooldown() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::RateLimited));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(5.0)));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let start = Instant::now();
    let report = fetcher.fetch(["A", "B"]).await.unwrap();

    assert_eq!(fallback.call_count(), 2);
    assert_eq!(report.success_count(), 2);
    assert!(report.rate_limited.is_empty());
    assert_eq!(start.elapsed(), Duration::from_millis(13_000));
}

#[tokio::test(start_paused = true)]
async fn test_both_providers_failing_resolves_to_null() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::Fail("HTTP 500")));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Fail("connection reset")));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let report = fetcher.fetch(["AAPL", "MSFT"]).await.unwrap();

    assert_eq!(report.prices.get("AAPL"), Some(&None));
    assert_eq!(report.prices.get("MSFT"), Some(&None));
    assert_eq!(report.failure_count(), 2);
    // One failure never stops the batch.
    assert_eq!(fallback.calls(), vec!["AAPL", "MSFT"]);
}

// =========================================================================
// Pacing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_fallback_rate_limit_adds_cooldown_before_next_ticker() {
    let fallback = Arc::new(
        MockProvider::new("FALLBACK", Answer::Price(20.0)).answer("HOT", Answer::RateLimited),
    );
    let fetcher = fetcher(None, &fallback, FetcherConfig::default());

    let start = Instant::now();
    let report = fetcher.fetch(["HOT", "COLD"]).await.unwrap();

    // 10s cooldown + 2s normal pause before COLD.
    assert_eq!(start.elapsed(), secs(12));
    assert_eq!(report.rate_limited, vec!["HOT"]);
    assert_eq!(report.price("HOT"), None);
    assert_eq!(report.price("COLD"), Some(20.0));
}

#[tokio::test(start_paused = true)]
async fn test_fallback_only_batches_pause_longer() {
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(1.0)));
    let fetcher = fetcher(None, &fallback, FetcherConfig::default());

    let start = Instant::now();
    let report = fetcher.fetch(tickers(12)).await.unwrap();

    // 10 short pauses (2s) and one batch pause (5s) after the 10th ticker.
    assert_eq!(start.elapsed(), secs(10 * 2 + 5));
    assert_eq!(start.elapsed(), fetcher.pacing().estimated_duration(12));
    assert_eq!(report.elapsed, start.elapsed());
}

#[tokio::test(start_paused = true)]
async fn test_primary_pacing_respects_per_minute_quota() {
    let primary = Arc::new(MockProvider::new("PRIMARY", Answer::Price(1.0)));
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(1.0)));
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let start = Instant::now();
    fetcher.fetch(tickers(6)).await.unwrap();

    // Five 13s pauses: never more than 5 primary calls in any 60s window.
    assert_eq!(start.elapsed(), secs(65));
}

#[tokio::test(start_paused = true)]
async fn test_pacing_overrides_are_honoured() {
    let fallback = Arc::new(
        MockProvider::new("FALLBACK", Answer::Price(1.0)).answer("T00", Answer::RateLimited),
    );
    let config = FetcherConfig {
        pacing: PacingOverrides {
            request_delay: Some(Duration::from_millis(100)),
            batch_delay: Some(Duration::ZERO),
            batch_size: None,
            rate_limit_cooldown: Some(secs(1)),
        },
        deadline: None,
    };
    let fetcher = fetcher(None, &fallback, config);

    let start = Instant::now();
    fetcher.fetch(tickers(3)).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(1_000 + 2 * 100));
}

#[tokio::test(start_paused = true)]
async fn test_calls_are_strictly_sequential_and_ordered() {
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(1.0)));
    let fetcher = fetcher(None, &fallback, FetcherConfig::default());

    fetcher.fetch(["C", "A", "B", "A"]).await.unwrap();

    assert_eq!(fallback.calls(), vec!["C", "A", "B"]);
    assert_eq!(fallback.max_in_flight.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Deadline
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_deadline_leaves_remaining_tickers_null() {
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(7.0)));
    let config = FetcherConfig {
        deadline: Some(secs(3)),
        ..Default::default()
    };
    let fetcher = fetcher(None, &fallback, config);

    let report = fetcher.fetch(["A", "B", "C", "D"]).await.unwrap();

    // A at t=0, B at t=2; the pause after B is cut short at t=3.
    assert_eq!(fallback.calls(), vec!["A", "B"]);
    assert!(report.deadline_exceeded);
    assert_eq!(report.elapsed, secs(3));
    assert_eq!(report.prices.len(), 4);
    assert_eq!(report.price("B"), Some(7.0));
    assert_eq!(report.prices.get("C"), Some(&None));
    assert_eq!(report.prices.get("D"), Some(&None));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cuts_off_a_slow_provider_call() {
    let fallback =
        Arc::new(MockProvider::new("FALLBACK", Answer::Price(7.0)).with_latency(secs(3)));
    let config = FetcherConfig {
        pacing: PacingOverrides {
            request_delay: Some(Duration::ZERO),
            ..Default::default()
        },
        deadline: Some(secs(4)),
    };
    let fetcher = fetcher(None, &fallback, config);

    let report = fetcher.fetch(["A", "B", "C"]).await.unwrap();

    // A answers at t=3; B is still in flight when the deadline hits at t=4.
    assert_eq!(fallback.calls(), vec!["A", "B"]);
    assert_eq!(report.price("A"), Some(7.0));
    assert_eq!(report.prices.get("B"), Some(&None));
    assert_eq!(report.prices.get("C"), Some(&None));
    assert!(report.deadline_exceeded);
    assert_eq!(report.elapsed, secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cuts_the_rate_limit_cooldown_short() {
    let fallback = Arc::new(
        MockProvider::new("FALLBACK", Answer::Price(1.0)).answer("HOT", Answer::RateLimited),
    );
    let config = FetcherConfig {
        deadline: Some(secs(5)),
        ..Default::default()
    };
    let fetcher = fetcher(None, &fallback, config);

    let report = fetcher.fetch(["HOT", "COLD"]).await.unwrap();

    assert_eq!(fallback.calls(), vec!["HOT"]);
    assert_eq!(report.rate_limited, vec!["HOT"]);
    assert_eq!(report.prices.get("COLD"), Some(&None));
    assert!(report.deadline_exceeded);
    assert!(report.elapsed <= secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_fetch_is_safe() {
    let fallback = Arc::new(MockProvider::new("FALLBACK", Answer::Price(7.0)));
    let fetcher = fetcher(None, &fallback, FetcherConfig::default());

    let batch = TickerBatch::new(tickers(5)).unwrap();
    let result = tokio::time::timeout(secs(3), fetcher.fetch_prices(&batch)).await;

    assert!(result.is_err());
    assert_eq!(fallback.call_count(), 2);

    // The fetcher holds no request state and is immediately reusable.
    let report = fetcher.fetch(["A"]).await.unwrap();
    assert_eq!(report.price("A"), Some(7.0));
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_mixed_scenario_with_primary_configured() {
    let primary = Arc::new(
        MockProvider::new("PRIMARY", Answer::NoPrice).answer("AAPL", Answer::Price(150.25)),
    );
    let fallback = Arc::new(
        MockProvider::new("FALLBACK", Answer::NoPrice)
            .answer("MSFT", Answer::Price(310.50))
            .answer("ZZZZINVALID", Answer::RateLimited),
    );
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let start = Instant::now();
    let report = fetcher
        .fetch(["AAPL", "MSFT", "ZZZZINVALID"])
        .await
        .unwrap();

    let json = serde_json::to_value(&report.prices).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"AAPL": 150.25, "MSFT": 310.50, "ZZZZINVALID": null})
    );
    assert_eq!(fallback.calls(), vec!["MSFT", "ZZZZINVALID"]);
    // Two 13s pauses plus the 10s cooldown after ZZZZINVALID.
    assert_eq!(start.elapsed(), secs(36));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_fetch_is_idempotent() {
    let primary = Arc::new(
        MockProvider::new("PRIMARY", Answer::NoPrice).answer("AAPL", Answer::Price(150.25)),
    );
    let fallback = Arc::new(
        MockProvider::new("FALLBACK", Answer::Fail("down")).answer("MSFT", Answer::Price(310.5)),
    );
    let fetcher = fetcher(Some(&primary), &fallback, FetcherConfig::default());

    let first = fetcher.fetch(["AAPL", "MSFT", "TSLA"]).await.unwrap();
    let second = fetcher.fetch(["AAPL", "MSFT", "TSLA"]).await.unwrap();

    assert_eq!(first.prices, second.prices);
    assert_eq!(first.sources, second.sources);
}
