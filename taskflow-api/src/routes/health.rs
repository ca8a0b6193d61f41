/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "OK",
///   "message": "TaskFlow Server is running",
///   "version": "0.1.0",
///   "database": "connected",
///   "timestamp": "2025-06-15T12:00:00Z"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Human-readable status message
    pub message: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Server time
    pub timestamp: DateTime<Utc>,
}

/// Health check handler
///
/// Returns service health including database connectivity. Public; no
/// credential required.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "OK".to_string()
        } else {
            "degraded".to_string()
        },
        message: "TaskFlow Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
        timestamp: Utc::now(),
    }))
}
