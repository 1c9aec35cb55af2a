//! Network error types

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use crate::protocol::ErrorBody;

/// Client result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors seen by [`crate::ApiClient`] and [`crate::Mirror`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server could not be reached
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with an error status
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    /// Rejected locally before reaching the server
    #[error(transparent)]
    Local(#[from] studyspace_core::Error),
}

impl Error {
    /// True when the failure says nothing about the request itself
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] studyspace_core::Error),

    #[error("Invalid request body: {0}")]
    Body(String),

    #[error("Invalid query: {0}")]
    Query(String),

    #[error("Not found")]
    RouteNotFound,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        use studyspace_core::Error as Core;

        match self {
            Self::Core(Core::Validation(_) | Core::Constraint(_)) => StatusCode::BAD_REQUEST,
            Self::Core(Core::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Core(Core::InvalidTransition(_)) => StatusCode::CONFLICT,
            Self::Core(_) | Self::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Body(_) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side details stay in the log
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyspace_core::Error as Core;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (Core::Validation("x".into()), StatusCode::BAD_REQUEST),
            (Core::Constraint("x".into()), StatusCode::BAD_REQUEST),
            (Core::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Core::InvalidTransition("x".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unavailable("lock poisoned".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = ApiError::from(Core::Validation("All booking fields are required".into()));
        assert_eq!(err.to_string(), "All booking fields are required");
    }

    #[test]
    fn test_server_errors_do_not_leak_details() {
        let response = ApiError::Unavailable("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
