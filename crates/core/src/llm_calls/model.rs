//! LLM call domain models.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recommendation attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Watch,
    Other(String),
}

impl Recommendation {
    pub fn as_str(&self) -> &str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WATCH",
            Recommendation::Other(other) => other,
        }
    }
}

impl From<String> for Recommendation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "STRONG BUY" => Recommendation::StrongBuy,
            "BUY" => Recommendation::Buy,
            "WATCH" => Recommendation::Watch,
            _ => Recommendation::Other(value),
        }
    }
}

impl From<Recommendation> for String {
    fn from(value: Recommendation) -> Self {
        value.as_str().to_string()
    }
}

/// Row of the `llm_calls` table, as returned by the database API.
///
/// The list columns (`transaction_dates`, `insider_names`, `market_patterns`,
/// `insider_prices_json`) are stored as JSON text but some clients hand them
/// over already decoded, so they are kept as raw values until
/// [`LlmCall::parse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmCall {
    pub id: i64,
    #[serde(default)]
    pub call_date: String,
    pub batch_id: Option<String>,
    pub ticker: String,
    pub company_name: Option<String>,
    pub recommendation: Recommendation,
    pub rank: Option<i64>,
    pub signal_strength: Option<f64>,
    pub time_horizon: Option<String>,
    pub number_of_insiders: Option<i64>,
    pub total_transaction_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_dates: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insider_names: Option<Value>,
    pub entry_price: Option<f64>,
    pub entry_date: String,
    #[serde(default)]
    pub entry_timestamp: String,
    pub price_change_pct: Option<f64>,
    pub holding_days: Option<i64>,
    pub pnl_dollars: Option<f64>,
    pub llm_rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_patterns: Option<Value>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub insider_avg_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insider_prices_json: Option<Value>,
    pub current_price: Option<f64>,
    pub last_price_update: Option<String>,
    pub traded: Option<bool>,
    pub is_closed: Option<bool>,
}

impl LlmCall {
    /// Open calls are the ones whose price still moves the dashboard.
    pub fn is_open(&self) -> bool {
        !self.is_closed.unwrap_or(false)
    }

    /// Decode the JSON list columns. Undecodable columns become empty lists.
    pub fn parse(mut self) -> ParsedLlmCall {
        let transaction_dates = parse_json_list(self.transaction_dates.take());
        let insider_names = parse_json_list(self.insider_names.take());
        let market_patterns = parse_json_list(self.market_patterns.take());
        let insider_prices_json = parse_json_list(self.insider_prices_json.take());

        ParsedLlmCall {
            call: self,
            transaction_dates,
            insider_names,
            market_patterns,
            insider_prices_json,
        }
    }
}

/// An [`LlmCall`] with its list columns decoded.
///
/// Serializes flat, with the decoded lists in place of the raw columns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParsedLlmCall {
    #[serde(flatten)]
    pub call: LlmCall,
    pub transaction_dates: Vec<String>,
    pub insider_names: Vec<String>,
    pub market_patterns: Vec<String>,
    pub insider_prices_json: Vec<Option<f64>>,
}

/// Decode a list column that may hold JSON text or an already-decoded array.
pub fn parse_json_list<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    let decoded = match value {
        Some(Value::String(text)) => serde_json::from_str(&text),
        Some(array @ Value::Array(_)) => serde_json::from_value(array),
        _ => return Vec::new(),
    };

    decoded.unwrap_or_else(|e| {
        debug!("Ignoring undecodable list column: {}", e);
        Vec::new()
    })
}
