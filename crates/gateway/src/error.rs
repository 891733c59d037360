//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crewdesk_auth::AuthError;
use crewdesk_database::UserError;
use crewdesk_users::{BatchErrors, BulkCreateError, ValidationErrors};

/// Gateway error taxonomy, mapped onto HTTP status codes
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input, reported per field
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// Bulk request rejected, reported per batch index
    #[error("validation failed for some records")]
    BatchValidation(BatchErrors),

    /// Bad credentials or missing/invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown id
    #[error("{0}")]
    NotFound(String),

    /// Transactional or infrastructure failure; `detail` carries the
    /// underlying error text shown to the client per the API contract
    #[error("{message}: {detail}")]
    Store { message: String, detail: String },
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Unauthenticated.".to_string())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid credentials".to_string())
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("User not found".to_string())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Store {
            message: "Internal server error".to_string(),
            detail: detail.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BatchValidation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(errors) => json!({
                "status": false,
                "message": "Validation failed",
                "errors": errors,
            }),
            ApiError::BatchValidation(errors) => json!({
                "status": false,
                "message": "Validation failed for some records.",
                "errors": errors,
            }),
            ApiError::Unauthorized(message) | ApiError::NotFound(message) => json!({
                "message": message,
            }),
            ApiError::Store { message, detail } => {
                tracing::error!(error = %detail, "store failure");
                json!({
                    "status": false,
                    "message": message,
                    "error": detail,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiError::invalid_credentials(),
            AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => ApiError::unauthenticated(),
            AuthError::Database(e) => ApiError::internal(e.to_string()),
            AuthError::PasswordHash(e) => ApiError::internal(e.to_string()),
            AuthError::UserLookup(e) => ApiError::internal(e),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => ApiError::user_not_found(),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<BulkCreateError> for ApiError {
    fn from(error: BulkCreateError) -> Self {
        match error {
            BulkCreateError::Validation(errors) => ApiError::BatchValidation(errors),
            BulkCreateError::Store(e) => ApiError::Store {
                message: "Failed to insert users.".to_string(),
                detail: e.to_string(),
            },
        }
    }
}
