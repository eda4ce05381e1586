use std::sync::Arc;

use crate::config::Config;
use toolhub_market_data::{AlphaVantageProvider, MarketDataProvider, PriceFetcher, YahooProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub fetcher: Arc<PriceFetcher>,
}

impl AppState {
    pub fn new(fetcher: PriceFetcher) -> Arc<Self> {
        Arc::new(Self {
            fetcher: Arc::new(fetcher),
        })
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("TH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let primary = config.alpha_vantage_api_key.as_ref().map(|key| {
        Arc::new(AlphaVantageProvider::new(key.clone())) as Arc<dyn MarketDataProvider>
    });
    let fallback: Arc<dyn MarketDataProvider> = Arc::new(YahooProvider::new()?);

    let fetcher = PriceFetcher::new(primary, fallback, config.fetcher.clone());
    if fetcher.provider_config().primary_configured {
        tracing::info!("Price providers: Alpha Vantage, then Yahoo Finance");
    } else {
        tracing::warn!("ALPHA_VANTAGE_API_KEY not set; using Yahoo Finance only");
    }
    tracing::info!("Price pacing: {:?}", fetcher.pacing());

    Ok(AppState::new(fetcher))
}
