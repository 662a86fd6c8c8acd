use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chart::deriver::ChartError;
use crate::geo::GeocodeError;
use crate::llm::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Date parse error: {0}")]
    DateParse(String),

    #[error("Location not found: {0}")]
    GeocodeNotFound(String),

    #[error("Chart computation error: {0}")]
    ChartComputation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::DateParse(msg) => AppError::DateParse(msg),
            ChartError::Computation(e) => AppError::ChartComputation(e.to_string()),
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(place) => AppError::GeocodeNotFound(place),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Generation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DateParse(msg) => (StatusCode::BAD_REQUEST, "DATE_PARSE_ERROR", msg.clone()),
            AppError::GeocodeNotFound(place) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "GEOCODE_NOT_FOUND",
                format!(
                    "Could not find the location {place:?}. Check the spelling or try a nearby city."
                ),
            ),
            AppError::ChartComputation(msg) => {
                tracing::error!("Chart computation error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CHART_COMPUTATION_ERROR",
                    "Chart computation failed".to_string(),
                )
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "The interpretation service is unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
