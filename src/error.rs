//! Error types for the store and the request-facing layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::LinkRecord;

/// Failures reported by the mapping store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The short code or the URL is already mapped; carries the owning record
    #[error("already mapped to short code `{}`", .0.short_code)]
    AlreadyExists(Box<LinkRecord>),

    #[error("storage backend failure: {0}")]
    Backend(#[from] redb::Error),

    #[error("stored record could not be decoded: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// redb reports each phase of a transaction with its own error type
macro_rules! impl_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Backend(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors surfaced by link creation and resolution
///
/// Client errors (`InvalidInput`, `NotFound`, `CodeConflict`) are detected
/// before or instead of any write. `GenerationExhausted` and
/// `StoreUnavailable` are systemic and map to 500, as does `Internal`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("URL not found")]
    NotFound,

    #[error("custom code `{0}` is already in use")]
    CodeConflict(String),

    #[error("failed to generate a unique short code after {0} attempts")]
    GenerationExhausted(usize),

    #[error("storage unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::CodeConflict(_) => StatusCode::CONFLICT,
            AppError::GenerationExhausted(_)
            | AppError::StoreUnavailable(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound => "not_found",
            AppError::CodeConflict(_) => "code_conflict",
            AppError::GenerationExhausted(_) => "generation_exhausted",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Backend details stay in the logs
        let message = match &self {
            AppError::StoreUnavailable(err) => {
                tracing::error!(error = %err, "store operation failed");
                "Internal storage error".to_string()
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "error": message,
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
