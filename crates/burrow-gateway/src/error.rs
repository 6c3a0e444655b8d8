use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::ShortenerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        match value {
            ShortenerError::NotFound(_) => AppError::NotFound("URL not found".to_string()),
            ShortenerError::AlreadyExists(_) => {
                AppError::Conflict("Custom code already exists".to_string())
            }
            ShortenerError::InvalidShortCode(reason) => {
                AppError::Validation(format!("Invalid custom code: {reason}"))
            }
            fault @ (ShortenerError::Generator(_) | ShortenerError::Storage(_)) => {
                error!(error = %fault, "request failed");
                AppError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::StorageError;

    #[test]
    fn shortener_errors_map_to_statuses() {
        let cases = [
            (ShortenerError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (ShortenerError::AlreadyExists("abc".into()), StatusCode::CONFLICT),
            (
                ShortenerError::InvalidShortCode("too short".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ShortenerError::Generator("entropy".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ShortenerError::Storage(StorageError::Timeout("pool".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let err = AppError::from(ShortenerError::Storage(StorageError::Query(
            "password authentication failed".into(),
        )));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
