/// Authentication middleware for Axum
///
/// Extracts the bearer credential from the `Authorization` header,
/// validates it, and adds an [`AuthContext`] to the request extensions so
/// handlers can identify the caller without further lookups.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, middleware, routing::get};
/// use taskflow_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(move |req, next| {
///         jwt_auth_middleware("your-jwt-secret".to_string(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::validate_token;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username from the token
    pub username: String,

    /// Email from the token
    pub email: String,
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing or malformed authorization header
    MissingCredentials,

    /// Token validation failed (bad signature, expired, wrong issuer)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Missing credential is 401; a credential that fails validation is
        // 403, so clients can tell "log in" apart from "re-login".
        let (status, message) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Access token required"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header and injects an
/// [`AuthContext`] on success.
///
/// # Errors
///
/// - 401 when the header is missing or not a Bearer credential
/// - 403 when the token fails validation or has expired
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, &secret).map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AuthError::InvalidToken
    })?;

    let auth_context = AuthContext {
        user_id: claims.sub,
        username: claims.username,
        email: claims.email,
    };
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
