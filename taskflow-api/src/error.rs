/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts automatically
/// to a status code plus a JSON body of the form `{error, details?}`.
///
/// Status mapping: validation problems and conflicts (duplicate user,
/// duplicate family membership) are client errors and render as 400;
/// missing or foreign resources render as 404 so nothing leaks about other
/// users' data; internal failures render as 500 with the cause logged but
/// hidden from the client.
///
/// # Example
///
/// ```ignore
/// use taskflow_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(serde_json::json!({ "data": data })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input (400)
    BadRequest(String),

    /// Missing or unusable credentials (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Resource absent or not owned by the caller (404)
    NotFound(String),

    /// Duplicate user, duplicate membership, and similar (400)
    Conflict {
        /// Client-facing message
        message: String,

        /// Optional extra context
        details: Option<String>,
    },

    /// Request validation failures (400)
    Validation(Vec<String>),

    /// Internal server error (500); the message is logged, not returned
    Internal(String),
}

impl ApiError {
    /// Convenience constructor for conflicts without extra detail
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            details: None,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Optional extra context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {}", errors.join(", "))
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict { message, details } => (StatusCode::BAD_REQUEST, message, details),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.join(", "), None),
            ApiError::Internal(msg) => {
                // Log the cause but never expose it to clients.
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations are the authoritative signal for duplicate
/// users and duplicate family memberships; they are translated here rather
/// than guarded by check-then-act SELECTs in handlers.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // Unique violation: which constraint tells us the message.
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("");
                    if constraint.contains("family_members") {
                        return ApiError::conflict("You are already a member of a family");
                    }
                    if constraint.contains("users_username") || constraint.contains("users_email") {
                        return ApiError::conflict(
                            "User already exists with this email or username",
                        );
                    }
                    ApiError::Conflict {
                        message: "Resource already exists".to_string(),
                        details: Some(format!("Constraint violation: {}", constraint)),
                    }
                }
                // Foreign key violation: bad reference from the client.
                Some("23503") => {
                    ApiError::BadRequest("Referenced resource does not exist".to_string())
                }
                // Check violation, e.g. priority out of range.
                Some("23514") => {
                    ApiError::BadRequest("Data does not meet requirements".to_string())
                }
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert request validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();

        ApiError::Validation(messages)
    }
}

/// Convert JWT errors to API errors
///
/// Token *validation* failures are handled by the auth middleware; the
/// only JWT errors reaching handlers come from token creation.
impl From<taskflow_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: taskflow_shared::auth::jwt::JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}

/// Convert password errors to API errors
impl From<taskflow_shared::auth::password::PasswordError> for ApiError {
    fn from(err: taskflow_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}
