// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::services::ServiceError> for ApiError {
    fn from(err: crate::services::ServiceError) -> Self {
        match err {
            crate::services::ServiceError::NotFound(msg) => ApiError::not_found(msg),
            crate::services::ServiceError::Conflict(msg) => ApiError::conflict(msg),
            crate::services::ServiceError::Database(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("Database error: {}", sqlx_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        match err {
            crate::database::DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            crate::database::DatabaseError::ConfigMissing(_)
            | crate::database::DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            crate::database::DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::auth::provider::AuthError> for ApiError {
    fn from(err: crate::auth::provider::AuthError) -> Self {
        use crate::auth::provider::AuthError;
        match err {
            // Collaborator messages shown to the user as-is
            AuthError::InvalidCredentials | AuthError::AlreadyRegistered => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::UnknownProvider(_) => ApiError::bad_request(err.to_string()),
            AuthError::Crypto(msg) => {
                tracing::error!("Credential error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            AuthError::Jwt(jwt_err) => {
                tracing::error!("JWT error: {}", jwt_err);
                ApiError::internal_server_error("Failed to issue session token")
            }
            AuthError::Database(sqlx_err) => {
                tracing::error!("Database error during auth: {}", sqlx_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        match err {
            crate::auth::JwtError::InvalidToken(msg) => ApiError::unauthorized(msg),
            other => {
                tracing::error!("JWT error: {}", other);
                ApiError::internal_server_error("Failed to issue session token")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
