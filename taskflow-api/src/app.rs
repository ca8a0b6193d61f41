/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware. The database pool and mailer are constructed
/// once at startup and injected here; handlers never reach for ambient
/// globals.
///
/// # Example
///
/// ```no_run
/// use taskflow_api::{app::AppState, config::Config};
/// use taskflow_shared::mail::Mailer;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Mailer::disabled());
/// let app = taskflow_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskflow_shared::{auth::middleware::jwt_auth_middleware, mail::Mailer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound mailer (SMTP or log-only)
    pub mailer: Mailer,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Mailer) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── /health                   # Health check (public)
/// ├── /auth/                    # Authentication (public)
/// │   ├── POST /register
/// │   ├── POST /login
/// │   └── POST /forgot-password
/// ├── /tasks/                   # Personal tasks (authenticated)
/// │   ├── GET    /
/// │   ├── POST   /
/// │   ├── PUT    /:id
/// │   ├── DELETE /:id
/// │   └── POST   /archive
/// ├── /family/                  # Family groups (authenticated)
/// │   ├── GET  /info
/// │   ├── POST /create
/// │   ├── POST /join
/// │   ├── GET  /members
/// │   ├── GET  /tasks
/// │   ├── POST /tasks
/// │   ├── PUT    /tasks/:task_id
/// │   └── DELETE /tasks/:task_id
/// └── /dashboard/               # Read-side rollups (authenticated)
///     ├── GET /stats
///     └── GET /analytics
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/archive", post(routes::tasks::archive_tasks));

    let family_routes = Router::new()
        .route("/info", get(routes::family::get_family_info))
        .route("/create", post(routes::family::create_family))
        .route("/join", post(routes::family::join_family))
        .route("/members", get(routes::family::get_family_members))
        .route(
            "/tasks",
            get(routes::family::get_family_tasks).post(routes::family::create_family_task),
        )
        .route(
            "/tasks/:task_id",
            put(routes::family::update_family_task).delete(routes::family::delete_family_task),
        );

    let dashboard_routes = Router::new()
        .route("/stats", get(routes::dashboard::get_stats))
        .route("/analytics", get(routes::dashboard::get_analytics));

    // Every task/family/dashboard route sits behind the bearer credential.
    let jwt_secret = state.jwt_secret().to_string();
    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/family", family_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum::middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_secret.clone(), req, next)
        }));

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
