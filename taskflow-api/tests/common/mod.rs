/// Common test utilities for integration tests
///
/// Shared infrastructure for the API integration tests:
/// - Database setup with migrations
/// - Test user creation with JWT tokens
/// - Request/response helpers for driving the router
///
/// Tests require `DATABASE_URL` and `JWT_SECRET` in the environment (a
/// `.env` file works); each test creates its own uniquely-named users and
/// cleans them up afterwards.

use axum::{
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;
use sqlx::PgPool;
use taskflow_api::app::{build_router, AppState};
use taskflow_api::config::Config;
use taskflow_shared::auth::jwt::{create_token, Claims};
use taskflow_shared::auth::password::hash_password;
use taskflow_shared::mail::Mailer;
use taskflow_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Password used for all test users
pub const TEST_PASSWORD: &str = "hunter22!";

/// Test context containing the app and a ready-made authenticated user
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to the crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let (user, token) = spawn_user(&db, &config.jwt.secret).await?;

        let state = AppState::new(db.clone(), config.clone(), Mailer::disabled());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns the Authorization header value for the context user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Cleans up test data
    ///
    /// Deleting the user cascades to their tasks, memberships, and any
    /// family they created.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates an extra user with a valid token, for multi-user tests
pub async fn spawn_user(db: &PgPool, jwt_secret: &str) -> anyhow::Result<(User, String)> {
    let suffix = Uuid::new_v4().simple().to_string();
    let user = User::create(
        db,
        CreateUser {
            username: format!("test-user-{}", &suffix[..12]),
            email: format!("test-{}@example.com", suffix),
            password_hash: hash_password(TEST_PASSWORD)?,
        },
    )
    .await?;

    let claims = Claims::new(user.id, user.username.clone(), user.email.clone());
    let token = create_token(&claims, jwt_secret)?;

    Ok((user, token))
}

/// Builds a JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::from("{}"),
    };

    builder.body(body).unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
