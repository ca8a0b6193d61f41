/// Dashboard endpoints
///
/// # Endpoints
///
/// - `GET /api/dashboard/stats` - Overall and per-week status counts
/// - `GET /api/dashboard/analytics?timeframe=` - Trailing-window trends
///
/// Both are read-only projections over the caller's active tasks: the
/// handlers fetch the relevant rows and defer to the pure aggregation
/// functions in [`taskflow_shared::dashboard`].

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    dashboard::{self, AnalyticsResponse, StatsResponse, TaskAnalyticsRow, TaskStatRow, Timeframe},
};

/// Analytics query parameters
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Trailing window: "week", "month" (default), or "year"
    pub timeframe: Option<String>,
}

/// Stats view: status counts overall and for the four most recent weeks
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<StatsResponse>> {
    let rows = sqlx::query_as::<_, TaskStatRow>(
        r#"
        SELECT status, week_start
        FROM tasks
        WHERE user_id = $1 AND archived = FALSE
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(dashboard::weekly_stats(&rows)))
}

/// Analytics view: per-day creation trend and priority distribution over a
/// trailing window
///
/// Unrecognized timeframe values fall back to the month default.
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let timeframe = Timeframe::parse_or_default(query.timeframe.as_deref());
    let window_start = Utc::now() - Duration::days(timeframe.days());

    let rows = sqlx::query_as::<_, TaskAnalyticsRow>(
        r#"
        SELECT created_at, status, priority
        FROM tasks
        WHERE user_id = $1 AND archived = FALSE AND created_at >= $2
        "#,
    )
    .bind(auth.user_id)
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(dashboard::analytics(&rows, timeframe)))
}
