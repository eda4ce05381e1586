//! Core error types for the toolhub application.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for dashboard operations.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("No open positions to update")]
    NoOpenPositions,
}
