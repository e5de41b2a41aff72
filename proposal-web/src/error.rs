//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proposal_auth::{AccountError, AuthError, ErrorKind, StoreError, TokenRejection};
use serde_json::json;
use tracing::{debug, error};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => ApiError::Conflict(err.to_string()),
            AccountError::UnknownAccount => ApiError::NotFound("User not found".to_string()),
            AccountError::Auth(e) => ApiError::Auth(e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            other => ApiError::Auth(other.into()),
        }
    }
}

impl ApiError {
    /// Status, error code and client-facing message.
    ///
    /// Auth failures get fixed messages; which check failed is only logged.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(err) => match err.kind() {
                ErrorKind::InvalidCredentials => (
                    StatusCode::FORBIDDEN,
                    "invalid_credentials",
                    "Invalid email or password".to_string(),
                ),
                ErrorKind::InvalidToken => {
                    let message = if err.rejection() == Some(TokenRejection::MissingHeader) {
                        "Missing Bearer Token"
                    } else {
                        "Invalid Bearer Token"
                    };
                    (StatusCode::UNAUTHORIZED, "invalid_token", message.to_string())
                }
                ErrorKind::Unauthorized => (
                    StatusCode::FORBIDDEN,
                    "unauthorized",
                    "Unauthorized".to_string(),
                ),
                ErrorKind::Infra => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                ),
            },
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message.clone())
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message.clone()),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
