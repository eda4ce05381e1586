//! Toolhub Core - Domain entities and calculations.
//!
//! This crate contains the business logic behind the insider-trading
//! "LLM calls" dashboard. It is storage-agnostic: rows come in as plain
//! values and results go out as plain values, so any database adapter or
//! HTTP layer can drive it.

pub mod errors;
pub mod llm_calls;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
