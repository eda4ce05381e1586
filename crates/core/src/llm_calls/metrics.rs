//! Per-call metrics and dashboard statistics.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{LlmCall, ParsedLlmCall, Recommendation};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Percentage move from entry to current price.
///
/// Returns `None` when either price is missing or zero.
pub fn pnl_pct(call: &LlmCall) -> Option<f64> {
    let current = call.current_price.filter(|p| *p != 0.0)?;
    let entry = call.entry_price.filter(|p| *p != 0.0)?;
    Some((current - entry) / entry * 100.0)
}

/// Whole days between the entry date and `now`, rounded up.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps (read
/// as UTC) and bare `YYYY-MM-DD` dates (UTC midnight).
pub fn holding_days(entry_date: &str, now: DateTime<Utc>) -> Option<i64> {
    let entry = parse_instant(entry_date)?;
    let millis = (now - entry).num_milliseconds().abs();
    Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

/// Earliest parseable date in an insider transaction list.
pub fn earliest_insider_date(dates: &[String]) -> Option<NaiveDate> {
    dates
        .iter()
        .filter_map(|d| parse_instant(d))
        .map(|instant| instant.date_naive())
        .min()
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A call as rendered on the dashboard.
///
/// Serialized with the row's own snake_case field names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CallView {
    #[serde(flatten)]
    pub call: ParsedLlmCall,
    pub pnl_pct: Option<f64>,
    pub days_held: Option<i64>,
    pub earliest_insider_date: Option<NaiveDate>,
}

/// Headline numbers shown above the call table.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_calls: usize,
    pub active_calls: usize,
    /// Mean P&L over calls that have one. Zero when none do.
    pub avg_pnl_pct: f64,
    pub total_transaction_value: f64,
    pub strong_buy_count: usize,
}

impl DashboardStats {
    pub fn from_calls(calls: &[LlmCall]) -> Self {
        let pnls: Vec<f64> = calls.iter().filter_map(pnl_pct).collect();
        let avg_pnl_pct = if pnls.is_empty() {
            0.0
        } else {
            pnls.iter().sum::<f64>() / pnls.len() as f64
        };

        Self {
            total_calls: calls.len(),
            active_calls: calls.iter().filter(|c| c.is_open()).count(),
            avg_pnl_pct,
            total_transaction_value: calls
                .iter()
                .filter_map(|c| c.total_transaction_value)
                .sum(),
            strong_buy_count: calls
                .iter()
                .filter(|c| c.recommendation == Recommendation::StrongBuy)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub calls: Vec<CallView>,
}

/// Which calls the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StatusFilter {
    pub fn matches(self, call: &LlmCall) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Open => call.is_open(),
            StatusFilter::Closed => !call.is_open(),
        }
    }
}

/// Build the dashboard payload for the calls selected by `filter`.
///
/// Stats cover the selected calls only.
pub fn summarize(
    mut calls: Vec<LlmCall>,
    filter: StatusFilter,
    now: DateTime<Utc>,
) -> DashboardSummary {
    calls.retain(|call| filter.matches(call));
    let stats = DashboardStats::from_calls(&calls);
    let calls = calls
        .into_iter()
        .map(|call| {
            let pnl_pct = pnl_pct(&call);
            let days_held = holding_days(&call.entry_date, now);
            let parsed = call.parse();
            let earliest_insider_date = earliest_insider_date(&parsed.transaction_dates);
            CallView {
                call: parsed,
                pnl_pct,
                days_held,
                earliest_insider_date,
            }
        })
        .collect();

    DashboardSummary { stats, calls }
}
