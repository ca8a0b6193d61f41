//! # TaskFlow API Server
//!
//! REST API for the TaskFlow household task manager: user accounts,
//! personal weekly tasks, family groups with leader-assigned tasks, and
//! dashboard rollups.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskflow-api
//! ```

use taskflow_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskflow_shared::{
    db::{migrations::run_migrations, pool},
    mail::Mailer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskflow_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskFlow API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let mailer = match config.smtp_config() {
        Some(smtp) => Mailer::connect(smtp)?,
        None => Mailer::disabled(),
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
