/// Personal task endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List the caller's active tasks
/// - `POST   /api/tasks` - Create a task in the current week
/// - `PUT    /api/tasks/:id` - Update a task (merge semantics)
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `POST   /api/tasks/archive` - Archive tasks older than last week
///
/// Every operation is scoped to the authenticated caller; a task owned by
/// someone else behaves exactly like a missing one (404).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskStatus, UpdateTask},
    week,
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title (required, trimmed, at most 200 characters)
    #[validate(length(max = 200, message = "Task title must be less than 200 characters"))]
    pub title: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Priority 1-3, defaults to 1
    #[validate(range(min = 1, max = 3, message = "Priority must be between 1 and 3"))]
    pub priority: Option<i16>,

    /// Initial status, defaults to pending
    pub status: Option<TaskStatus>,
}

/// Update task request
///
/// Absent fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title (trimmed, at most 200 characters)
    #[validate(length(max = 200, message = "Task title must be less than 200 characters"))]
    pub title: Option<String>,

    /// New description (empty string clears it)
    pub description: Option<String>,

    /// New priority 1-3
    #[validate(range(min = 1, max = 3, message = "Priority must be between 1 and 3"))]
    pub priority: Option<i16>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Delete task response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Outcome message
    pub message: String,
}

/// Archive response
#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    /// Outcome message
    pub message: String,

    /// Number of tasks archived by this call
    pub archived_count: u64,
}

/// Extracts a required, trimmed, non-empty title from an optional field
fn require_title(title: Option<String>) -> Result<String, ApiError> {
    let title = title.unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Task title is required".to_string()));
    }
    Ok(title)
}

/// Normalizes a description: trims and maps empty to None
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Lists the caller's active (non-archived) tasks
///
/// Ordered pending-first, then priority descending, then newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_active(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

/// Creates a task in the caller's current week bucket
///
/// # Errors
///
/// - `400 Bad Request`: missing/empty title, title too long, bad priority
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;
    let title = require_title(req.title)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            title,
            description: normalize_description(req.description),
            priority: req.priority,
            status: req.status,
            week_start: week::current_week_start(),
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, user_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Updates a task, merging supplied fields over the stored record
///
/// # Errors
///
/// - `400 Bad Request`: supplied-but-empty title, bad priority
/// - `404 Not Found`: no task with this ID owned by the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    // A title, when supplied, must still be non-empty after trimming.
    let title = match req.title {
        Some(title) => Some(require_title(Some(title))?),
        None => None,
    };

    let task = Task::update(
        &state.db,
        id,
        auth.user_id,
        UpdateTask {
            title,
            description: req.description.map(|d| d.trim().to_string()),
            priority: req.priority,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task owned by the caller
///
/// # Errors
///
/// - `404 Not Found`: no task with this ID owned by the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted = Task::delete(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Archives the caller's tasks from weeks strictly before last week
///
/// Idempotent: a second call with no newly-qualifying tasks reports 0.
pub async fn archive_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ArchiveResponse>> {
    let cutoff = week::archive_cutoff(week::current_week_start());
    let archived_count = Task::archive_old(&state.db, auth.user_id, cutoff).await?;

    tracing::debug!(user_id = %auth.user_id, archived_count, "Archived old tasks");

    Ok(Json(ArchiveResponse {
        message: "Tasks archived successfully".to_string(),
        archived_count,
    }))
}
