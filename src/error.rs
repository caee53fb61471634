// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Fatal pipeline errors. Per-record problems never end up here; they are
/// absorbed into `PipelineResult::skipped` or a null datetime.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("decimal overflow while summing transaction values")]
    Overflow,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Please enter a wallet address")]
    MissingAddress,
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("scan depth {requested} exceeds the limit of {max} blocks")]
    ScanTooDeep { requested: u64, max: u64 },
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("record source failed: {0}")]
    Source(eyre::Report),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAddress
            | ApiError::InvalidAddress(_)
            | ApiError::ScanTooDeep { .. } => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::InvalidInput(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::Overflow) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Source(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
