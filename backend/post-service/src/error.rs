/// Error types for the post service
///
/// Every failure in the ingestion pipeline maps to one of these variants and
/// is rendered as a uniform `{"message": ...}` JSON body. A `detail` field
/// with the underlying cause is attached only outside production.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// The media object could not be written to remote storage
    #[error("Error uploading image")]
    Upload(String),

    /// The prediction service failed or returned an unusable response
    #[error("Error calling prediction API")]
    Classification(String),

    /// Database operation failed
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Anything else
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Underlying cause, exposed to clients only outside production.
    fn detail(&self) -> Option<String> {
        match self {
            AppError::Upload(detail)
            | AppError::Classification(detail)
            | AppError::Internal(detail) => Some(detail.clone()),
            AppError::Database(err) => Some(err.to_string()),
            AppError::Validation(_) | AppError::NotFound(_) => None,
        }
    }
}

fn is_production() -> bool {
    std::env::var("APP_ENV")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(_)
            | AppError::Classification(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let mut body = serde_json::json!({
            "message": self.to_string(),
        });

        if !is_production() {
            if let Some(detail) = self.detail() {
                body["detail"] = serde_json::Value::String(detail);
            }
        }

        HttpResponse::build(status).json(body)
    }
}
