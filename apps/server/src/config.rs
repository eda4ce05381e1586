use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use toolhub_market_data::{FetcherConfig, PacingOverrides};

/// Time kept between the end of a price fetch and the request timeout, so the
/// partial result is still written out.
const DEADLINE_MARGIN: Duration = Duration::from_secs(5);

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Alpha Vantage key. `None` runs the fetcher in fallback-only mode.
    pub alpha_vantage_api_key: Option<String>,
    pub fetcher: FetcherConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = parse_var(&lookup, "TH_LISTEN_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let cors_allow = lookup("TH_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var(&lookup, "TH_REQUEST_TIMEOUT_MS")?.unwrap_or(900_000);
        let alpha_vantage_api_key = lookup("ALPHA_VANTAGE_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let pacing = PacingOverrides {
            request_delay: parse_millis(&lookup, "TH_PRICE_REQUEST_DELAY_MS")?,
            batch_delay: parse_millis(&lookup, "TH_PRICE_BATCH_DELAY_MS")?,
            batch_size: parse_var(&lookup, "TH_PRICE_BATCH_SIZE")?,
            rate_limit_cooldown: parse_millis(&lookup, "TH_RATE_LIMIT_COOLDOWN_MS")?,
        };
        let request_timeout = Duration::from_millis(timeout_ms);
        let deadline = match parse_millis(&lookup, "TH_PRICE_FETCH_DEADLINE_MS")? {
            Some(deadline) if deadline >= request_timeout => {
                return Err(anyhow!(
                    "TH_PRICE_FETCH_DEADLINE_MS ({:?}) must be shorter than TH_REQUEST_TIMEOUT_MS ({:?})",
                    deadline,
                    request_timeout
                ));
            }
            Some(deadline) => deadline,
            None => request_timeout - DEADLINE_MARGIN.min(request_timeout / 10),
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            alpha_vantage_api_key,
            fetcher: FetcherConfig {
                pacing,
                deadline: Some(deadline),
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: {:?}", key, raw)),
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> anyhow::Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<u64, F>(lookup, key)?.map(Duration::from_millis))
}
