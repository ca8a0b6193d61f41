/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account, returns user + token
/// - `POST /api/auth/login` - Exchange credentials for a token
/// - `POST /api/auth/forgot-password` - Request a password reset email
///
/// Login and forgot-password deliberately answer the same way whether or
/// not the account exists, to prevent user enumeration.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{jwt, password},
    mail::templates,
    models::{
        reset_token::{generate_reset_token, PasswordResetToken},
        user::{CreateUser, User, UserSummary},
    },
};

/// Generic forgot-password reply, identical for known and unknown accounts
const RESET_SENT_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Register request
///
/// Fields are optional at the serde level so that missing input surfaces
/// as a 400 validation message rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired username (at least 3 characters)
    pub username: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Password (at least 6 characters)
    pub password: Option<String>,
}

/// Register / login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Outcome message
    pub message: String,

    /// The authenticated user
    pub user: UserSummary,

    /// Bearer credential, valid for 24 hours
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Forgot-password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Email address to send the reset link to
    pub email: Option<String>,
}

/// Forgot-password response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Outcome message
    pub message: String,
}

fn validate_registration(req: &RegisterRequest) -> Result<(String, String, String), ApiError> {
    let mut errors = Vec::new();

    let username = req.username.as_deref().unwrap_or("").trim().to_string();
    if username.len() < 3 {
        errors.push("Username must be at least 3 characters long".to_string());
    }

    let email = req.email.as_deref().unwrap_or("").trim().to_string();
    if email.is_empty() || !is_valid_email(&email) {
        errors.push("Valid email address is required".to_string());
    }

    let password = req.password.clone().unwrap_or_default();
    if password.len() < 6 {
        errors.push("Password must be at least 6 characters long".to_string());
    }

    if errors.is_empty() {
        Ok((username, email, password))
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Minimal email shape check: one `@` with a dot somewhere after it
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or username/email already taken
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (username, email, plain_password) = validate_registration(&req)?;

    if User::exists_by_username_or_email(&state.db, &username, &email).await? {
        return Err(ApiError::conflict(
            "User already exists with this email or username",
        ));
    }

    let password_hash = password::hash_password(&plain_password)?;

    // The unique constraints remain the authoritative guard against a
    // concurrent registration slipping past the check above.
    let user = User::create(
        &state.db,
        CreateUser {
            username,
            email,
            password_hash,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.username.clone(), user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    // Fire-and-forget: delivery failures must not fail the registration.
    let mailer = state.mailer.clone();
    let (to, welcome_username) = (user.email.clone(), user.username.clone());
    tokio::spawn(async move {
        mailer
            .send(
                &to,
                templates::WELCOME_SUBJECT,
                templates::welcome_email(&welcome_username),
            )
            .await;
    });

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

/// Login endpoint
///
/// # Errors
///
/// - `400 Bad Request`: missing email or password
/// - `401 Unauthorized`: invalid credentials (same message for unknown
///   email and wrong password)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, user.username.clone(), user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserSummary::from(&user),
        token,
    }))
}

/// Forgot-password endpoint
///
/// Always answers with the same generic message, whether or not the email
/// belongs to an account. When it does, a fresh reset token (1 hour TTL)
/// replaces any prior one and a reset link is emailed.
///
/// # Errors
///
/// - `400 Bad Request`: missing email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = req.email.unwrap_or_default();
    if email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        return Ok(Json(MessageResponse {
            message: RESET_SENT_MESSAGE.to_string(),
        }));
    };

    let reset_token = generate_reset_token();
    PasswordResetToken::upsert(&state.db, user.id, &reset_token).await?;

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.config.email.frontend_url, reset_token
    );

    tracing::info!(user_id = %user.id, "Password reset requested");

    let mailer = state.mailer.clone();
    let (to, username) = (user.email.clone(), user.username.clone());
    tokio::spawn(async move {
        mailer
            .send(
                &to,
                templates::PASSWORD_RESET_SUBJECT,
                templates::password_reset(&username, &reset_url),
            )
            .await;
    });

    Ok(Json(MessageResponse {
        message: RESET_SENT_MESSAGE.to_string(),
    }))
}
