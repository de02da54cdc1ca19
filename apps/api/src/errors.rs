use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model_client::ModelError;

/// Application-level error type covering every terminal failure in the
/// pipeline. Implements `IntoResponse` so Axum handlers can return
/// `Result<T, AppError>`.
///
/// Every variant is terminal for the current request: nothing here triggers
/// an automatic retry. The Display text is the user-facing message, so it
/// must never carry internal diagnostics or credential material.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Too many requests")]
    Throttled,

    #[error("Unsupported Content-Type")]
    UnsupportedFormat,

    #[error("Description and Resume are required")]
    MissingFields,

    #[error("Only PDF files are supported")]
    UnsupportedDocumentType,

    #[error("Failed to read PDF file")]
    DocumentReadError,

    #[error("{0}")]
    LengthOutOfBounds(String),

    #[error("{0}")]
    InvalidCredential(&'static str),

    #[error("High analysis load. Please try again in a minute.")]
    Overloaded,

    /// Opaque upstream failure; the payload is server-side detail only.
    #[error("Failed to process analysis")]
    Upstream(String),

    #[error("Analysis blocked by safety filters.")]
    BlockedByPolicy,

    #[error("Invalid response structure from AI")]
    MalformedEnvelope,

    #[error("Failed to interpret analysis results")]
    UnparseableResult,

    #[error("Analysis timed out. Please try again.")]
    Timeout,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Throttled | AppError::Overloaded => StatusCode::TOO_MANY_REQUESTS,
            AppError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::MissingFields
            | AppError::UnsupportedDocumentType
            | AppError::DocumentReadError
            | AppError::LengthOutOfBounds(_)
            | AppError::InvalidCredential(_)
            | AppError::BlockedByPolicy => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::MalformedEnvelope | AppError::UnparseableResult => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Overloaded => AppError::Overloaded,
            ModelError::Timeout => AppError::Timeout,
            ModelError::Upstream { status } => {
                AppError::Upstream(format!("model endpoint returned status {status}"))
            }
            ModelError::Transport(e) => AppError::Upstream(format!("transport failure: {e}")),
            ModelError::Decode(e) => {
                tracing::error!("model envelope decode failed: {e}");
                AppError::MalformedEnvelope
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Upstream(detail) => tracing::error!("Upstream failure: {detail}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::Timeout => tracing::warn!("Model call abandoned on timeout"),
            _ => {}
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_and_overload_are_both_429() {
        assert_eq!(AppError::Throttled.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::Overloaded.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_validation_failures_are_400() {
        for err in [
            AppError::MissingFields,
            AppError::UnsupportedDocumentType,
            AppError::DocumentReadError,
            AppError::LengthOutOfBounds("too short".to_string()),
            AppError::InvalidCredential("Invalid API key format"),
            AppError::BlockedByPolicy,
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_unsupported_format_is_415() {
        assert_eq!(
            AppError::UnsupportedFormat.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_upstream_failures_are_500() {
        assert_eq!(
            AppError::Upstream("status 503".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MalformedEnvelope.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::UnparseableResult.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_is_504() {
        assert_eq!(AppError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_model_error_conversion() {
        assert!(matches!(
            AppError::from(ModelError::Overloaded),
            AppError::Overloaded
        ));
        assert!(matches!(
            AppError::from(ModelError::Timeout),
            AppError::Timeout
        ));
        assert!(matches!(
            AppError::from(ModelError::Upstream { status: 503 }),
            AppError::Upstream(_)
        ));
    }

    #[test]
    fn test_user_message_hides_upstream_detail() {
        let err = AppError::Upstream("secret diagnostic body".to_string());
        assert_eq!(err.to_string(), "Failed to process analysis");
    }
}
