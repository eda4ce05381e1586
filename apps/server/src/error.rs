use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use toolhub_core::errors::Error as CoreError;
use toolhub_market_data::MarketDataError;

/// Message returned when the price endpoint fails for any reason other than
/// a malformed ticker list.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch stock prices";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    MarketData(#[from] MarketDataError),
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Core(CoreError::Validation(reason)) => {
                (StatusCode::BAD_REQUEST, reason, None)
            }
            ApiError::Core(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
            ApiError::MarketData(MarketDataError::ValidationFailed { message }) => {
                (StatusCode::BAD_REQUEST, message, None)
            }
            ApiError::MarketData(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                FETCH_FAILED_MESSAGE.to_string(),
                Some(e.to_string()),
            ),
            ApiError::Internal { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
        };

        if status.is_server_error() {
            tracing::error!(code = status.as_u16(), details = ?details, "{}", error);
        }

        let body = Json(ErrorBody {
            code: status.as_u16(),
            error,
            details,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
