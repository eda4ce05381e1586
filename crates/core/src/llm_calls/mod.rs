//! LLM calls module.
//!
//! An "LLM call" is a trade idea produced by the insider-trading model: a
//! ticker, a recommendation, the insider activity that motivated it and the
//! entry price it was opened at. This module provides:
//!
//! - **Models** (`model.rs`) - Row model, lenient parsing of JSON-encoded list columns
//! - **Metrics** (`metrics.rs`) - P&L, holding period and dashboard statistics
//! - **Refresh** (`refresh.rs`) - Turning fetched prices into per-call updates

mod metrics;
mod model;
mod refresh;

pub use metrics::{
    earliest_insider_date, holding_days, pnl_pct, summarize, CallView, DashboardStats,
    DashboardSummary, StatusFilter,
};
pub use model::{parse_json_list, LlmCall, ParsedLlmCall, Recommendation};
pub use refresh::{open_call_tickers, parse_manual_price, price_updates, PriceUpdate};
