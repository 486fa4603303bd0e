use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(e) => {
                let code = e.kind().code();
                match e {
                    AnalysisError::Auth(msg) => {
                        tracing::warn!("Generation backend rejected credential: {msg}");
                        (
                            StatusCode::UNAUTHORIZED,
                            code,
                            "The API key is invalid or expired. Provide a new key to retry."
                                .to_string(),
                        )
                    }
                    AnalysisError::ServiceUnavailable(msg) => {
                        tracing::error!("Generation backend unavailable: {msg}");
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            code,
                            "The analysis service is currently unavailable. Please try again later."
                                .to_string(),
                        )
                    }
                    AnalysisError::Input(msg) => (StatusCode::BAD_REQUEST, code, msg.clone()),
                }
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "The analysis could not be saved".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_401_invalid_key() {
        let (status, code, _) = AppError::from(AnalysisError::Auth("bad".into())).parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "INVALID_API_KEY");
    }

    #[test]
    fn test_service_unavailable_maps_to_503() {
        let (status, code, _) =
            AppError::from(AnalysisError::ServiceUnavailable("down".into())).parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_input_error_maps_to_400() {
        let (status, code, message) =
            AppError::from(AnalysisError::Input("no resume".into())).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "no resume");
    }

    #[test]
    fn test_persistence_error_hides_details() {
        let (status, code, message) = AppError::Persistence("pg: timeout".into()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "PERSISTENCE_ERROR");
        assert!(!message.contains("pg"));
    }
}
