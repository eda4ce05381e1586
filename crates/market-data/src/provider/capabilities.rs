//! Provider rate limiting metadata.

use std::time::Duration;

/// Published (or observed) quota of a provider.
///
/// Informational: the fetcher's pacing policy is what actually spaces calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Maximum requests allowed per day, if the provider enforces one.
    pub requests_per_day: Option<u32>,

    /// Minimum delay between requests that keeps us under the per-minute quota.
    pub min_delay: Duration,
}

impl RateLimit {
    /// Quota derived from a per-minute limit.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let per_request_ms = 60_000 / u64::from(requests_per_minute.max(1));
        Self {
            requests_per_minute,
            requests_per_day: None,
            min_delay: Duration::from_millis(per_request_ms),
        }
    }

    /// Attach a daily quota.
    pub fn with_daily_limit(mut self, requests_per_day: u32) -> Self {
        self.requests_per_day = Some(requests_per_day);
        self
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

impl std::fmt::Display for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/min", self.requests_per_minute)?;
        if let Some(daily) = self.requests_per_day {
            write!(f, ", {}/day", daily)?;
        }
        Ok(())
    }
}
