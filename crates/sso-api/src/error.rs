//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use sso_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(AppError::validation(errors.to_string()))
    }
}

/// HTTP status for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidCredentials
        | ErrorKind::InvalidToken
        | ErrorKind::MalformedToken
        | ErrorKind::CorruptClaims => StatusCode::UNAUTHORIZED,
        ErrorKind::UserNotFound => StatusCode::NOT_FOUND,
        ErrorKind::UserAlreadyExists => StatusCode::CONFLICT,
        ErrorKind::Validation | ErrorKind::InvalidResetToken => StatusCode::BAD_REQUEST,
        ErrorKind::Store
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let message = if err.kind.is_client_error() {
            err.message
        } else {
            tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
            "An internal error occurred".to_string()
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::CorruptClaims), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::InvalidResetToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Store), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_operational_message_hidden() {
        let response = ApiError(AppError::store("Auth.Login: password=hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
