//! Provider selection and pacing configuration.

use std::time::Duration;

/// Inter-request delay when the primary provider (5 calls/min) is in use.
const PRIMARY_REQUEST_DELAY: Duration = Duration::from_millis(13_000);
const PRIMARY_BATCH_SIZE: usize = 5;
const PRIMARY_BATCH_DELAY: Duration = Duration::ZERO;

/// Fallback-only pacing. The fallback publishes no quota, so batches get an
/// extra cooldown.
const FALLBACK_REQUEST_DELAY: Duration = Duration::from_millis(2_000);
const FALLBACK_BATCH_SIZE: usize = 10;
const FALLBACK_BATCH_DELAY: Duration = Duration::from_millis(5_000);

/// Extra wait after the fallback provider signals throttling.
const RATE_LIMIT_COOLDOWN: Duration = Duration::from_millis(10_000);

/// Which provider ordering is active. Read-only for the life of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Whether a primary-provider credential is configured.
    pub primary_configured: bool,
}

/// Timing policy for one fetch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Pause between two consecutive tickers.
    pub request_delay: Duration,
    /// Pause applied instead of `request_delay` after every `batch_size` tickers.
    /// Zero disables batch pauses.
    pub batch_delay: Duration,
    /// Number of tickers per batch.
    pub batch_size: usize,
    /// Extra pause after the fallback provider rate limits a ticker.
    pub rate_limit_cooldown: Duration,
}

impl PacingPolicy {
    /// Pacing for the primary → fallback cascade.
    pub fn primary() -> Self {
        Self {
            request_delay: PRIMARY_REQUEST_DELAY,
            batch_delay: PRIMARY_BATCH_DELAY,
            batch_size: PRIMARY_BATCH_SIZE,
            rate_limit_cooldown: RATE_LIMIT_COOLDOWN,
        }
    }

    /// Pacing when the fallback provider is the sole source.
    pub fn fallback_only() -> Self {
        Self {
            request_delay: FALLBACK_REQUEST_DELAY,
            batch_delay: FALLBACK_BATCH_DELAY,
            batch_size: FALLBACK_BATCH_SIZE,
            rate_limit_cooldown: RATE_LIMIT_COOLDOWN,
        }
    }

    /// Derive the policy for a provider selection, applying overrides.
    pub fn derive(providers: ProviderConfig, overrides: &PacingOverrides) -> Self {
        let base = if providers.primary_configured {
            Self::primary()
        } else {
            Self::fallback_only()
        };

        Self {
            request_delay: overrides.request_delay.unwrap_or(base.request_delay),
            batch_delay: overrides.batch_delay.unwrap_or(base.batch_delay),
            batch_size: overrides.batch_size.unwrap_or(base.batch_size).max(1),
            rate_limit_cooldown: overrides
                .rate_limit_cooldown
                .unwrap_or(base.rate_limit_cooldown),
        }
    }

    /// Pause to take after the ticker at 1-based `position` out of `total`.
    ///
    /// Nothing follows the last ticker. A batch boundary takes the batch
    /// pause when one is configured, otherwise the normal request pause.
    pub fn delay_after(&self, position: usize, total: usize) -> Option<Duration> {
        if position >= total {
            return None;
        }

        let batch_end = position % self.batch_size == 0;
        if batch_end && !self.batch_delay.is_zero() {
            Some(self.batch_delay)
        } else {
            Some(self.request_delay)
        }
    }

    /// Worst-case wall time for `total` tickers, ignoring provider latency
    /// and rate-limit cooldowns.
    pub fn estimated_duration(&self, total: usize) -> Duration {
        (1..=total)
            .filter_map(|position| self.delay_after(position, total))
            .sum()
    }
}

/// Operator overrides for the pacing constants. `None` keeps the default of
/// the active provider ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacingOverrides {
    pub request_delay: Option<Duration>,
    pub batch_delay: Option<Duration>,
    pub batch_size: Option<usize>,
    pub rate_limit_cooldown: Option<Duration>,
}

/// Fetcher configuration injected at construction.
#[derive(Clone, Debug, Default)]
pub struct FetcherConfig {
    pub pacing: PacingOverrides,
    /// Overall time budget for one fetch. Pauses are cut short at the
    /// deadline; the ticker in flight and all later ones resolve to null.
    pub deadline: Option<Duration>,
}
