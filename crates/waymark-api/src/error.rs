//! Waymark — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use waymark_core::error::TourError;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The template document could not be read or failed validation.
    #[error("template error: {0}")]
    Templates(#[from] TourError),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No tour session with this id is registered.
    #[error("tour session {0} not found")]
    SessionNotFound(Uuid),

    /// The tour has not produced a completion certificate.
    #[error("tour session {0} has no certificate")]
    CertificateNotFound(Uuid),

    /// The narration token does not match the clip being played.
    #[error("no narration clip {0} is awaiting playback")]
    StaleNarration(u64),

    /// The tour layer rejected the request.
    #[error(transparent)]
    Tour(#[from] TourError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            Self::CertificateNotFound(_) => (StatusCode::NOT_FOUND, "certificate_not_found"),
            Self::StaleNarration(_) => (StatusCode::CONFLICT, "stale_narration"),
            Self::Tour(TourError::TemplateEmpty(_) | TourError::InvalidTemplate(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_template")
            }
            Self::Tour(TourError::SessionEnded) => (StatusCode::GONE, "session_ended"),
            Self::Tour(TourError::AlreadyStarted) => (StatusCode::CONFLICT, "already_started"),
            Self::Tour(TourError::Persistence(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
            }
            Self::Tour(
                TourError::Navigation(_) | TourError::Narration(_) | TourError::NarrationTimeout(_),
            ) => (StatusCode::BAD_GATEWAY, "collaborator_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_unknown_session_maps_to_404() {
        assert_eq!(
            status_of(ApiError::SessionNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_ended_session_maps_to_410() {
        assert_eq!(status_of(TourError::SessionEnded.into()), StatusCode::GONE);
    }

    #[test]
    fn test_bad_template_maps_to_400() {
        assert_eq!(
            status_of(TourError::TemplateEmpty("welcome".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(TourError::InvalidTemplate("duplicate step".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_stale_narration_maps_to_409() {
        assert_eq!(status_of(ApiError::StaleNarration(3)), StatusCode::CONFLICT);
    }

    #[test]
    fn test_persistence_maps_to_500() {
        assert_eq!(
            status_of(TourError::Persistence("db down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
