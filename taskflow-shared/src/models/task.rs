/// Personal task model and lifecycle operations
///
/// Tasks belong to exactly one owning user and are bucketed into the week
/// they were created in (`week_start`, always a Sunday — see [`crate::week`]).
/// Status moves freely between pending and completed; `completed_at` is
/// non-null exactly when the status is completed. Archival is a separate,
/// one-way flag: archived tasks drop out of active views but are kept for
/// history.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     priority SMALLINT NOT NULL DEFAULT 1 CHECK (priority BETWEEN 1 AND 3),
///     status task_status NOT NULL DEFAULT 'pending',
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     week_start DATE NOT NULL,
///     completed_at TIMESTAMPTZ,
///     archived BOOLEAN NOT NULL DEFAULT FALSE,
///     archived_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The `task_status` enum declares 'pending' before 'completed', so
/// `ORDER BY status ASC` lists pending tasks first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task has not been completed yet
    Pending,

    /// Task has been completed
    Completed,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Timestamp to store in `completed_at` for this status
    ///
    /// Upholds the invariant `completed_at IS NOT NULL ⇔ status = completed`.
    pub fn completed_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending => None,
        }
    }
}

/// Task model representing a personal weekly task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task title (trimmed, non-empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority 1 (low) to 3 (high)
    pub priority: i16,

    /// Completion status
    pub status: TaskStatus,

    /// Assigned user; for personal tasks this is always the owner
    pub assigned_to: Uuid,

    /// Sunday of the week this task belongs to
    pub week_start: NaiveDate,

    /// When the task was completed (null while pending)
    pub completed_at: Option<DateTime<Utc>>,

    /// Whether the task has been archived (one-way)
    pub archived: bool,

    /// When the task was archived
    pub archived_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Task title (already trimmed and validated non-empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority, defaults to 1
    pub priority: Option<i16>,

    /// Initial status, defaults to pending
    pub status: Option<TaskStatus>,

    /// Week bucket for the task, normally the current week's Sunday
    pub week_start: NaiveDate,
}

/// Input for updating a task
///
/// All fields are optional; absent fields keep their stored values. The
/// update merges against the fetched record rather than overwriting the
/// whole row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (empty string clears it)
    pub description: Option<String>,

    /// New priority
    pub priority: Option<i16>,

    /// New status; `completed_at` is recomputed from the result
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Creates a new task in the owner's current week bucket
    ///
    /// Applies defaults (priority 1, status pending), assigns the task to
    /// its owner, and sets `completed_at` iff the initial status is
    /// completed.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(TaskStatus::Pending);
        let completed_at = status.completed_at(Utc::now());

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, priority, status,
                               assigned_to, week_start, completed_at)
            VALUES ($1, $2, $3, $4, $5, $1, $6, $7)
            RETURNING id, user_id, title, description, priority, status,
                      assigned_to, week_start, completed_at, archived,
                      archived_at, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority.unwrap_or(1))
        .bind(status)
        .bind(data.week_start)
        .bind(completed_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID scoped to its owner
    ///
    /// This is the only lookup exposed to API handlers: a task that exists
    /// but belongs to another user is indistinguishable from one that does
    /// not exist.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, status,
                   assigned_to, week_start, completed_at, archived,
                   archived_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the owner's active (non-archived) tasks
    ///
    /// Ordered pending-first, then by priority descending, then newest
    /// first within the same priority.
    pub async fn list_active(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, status,
                   assigned_to, week_start, completed_at, archived,
                   archived_at, created_at, updated_at
            FROM tasks
            WHERE user_id = $1 AND archived = FALSE
            ORDER BY status ASC, priority DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, merging supplied fields over the stored record
    ///
    /// Returns `None` when no task with this ID is owned by `user_id`.
    /// `completed_at` is recomputed from the resulting status: set to now
    /// when completed, cleared when pending.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id_and_owner(pool, id, user_id).await? else {
            return Ok(None);
        };

        let title = data.title.unwrap_or(existing.title);
        let description = match data.description {
            Some(d) if d.is_empty() => None,
            Some(d) => Some(d),
            None => existing.description,
        };
        let priority = data.priority.unwrap_or(existing.priority);
        let status = data.status.unwrap_or(existing.status);
        let completed_at = status.completed_at(Utc::now());

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                priority = $5,
                status = $6,
                completed_at = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, priority, status,
                      assigned_to, week_start, completed_at, archived,
                      archived_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(status)
        .bind(completed_at)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task owned by `user_id`
    ///
    /// Hard delete, not archival. Returns false when no owned task matched.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Archives the owner's tasks from weeks strictly before last week
    ///
    /// Marks every non-archived task with `week_start < cutoff` as
    /// archived and stamps `archived_at`. Returns the number of tasks
    /// affected; running it again without new qualifying tasks returns 0.
    pub async fn archive_old(
        pool: &PgPool,
        user_id: Uuid,
        cutoff: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET archived = TRUE,
                archived_at = NOW(),
                updated_at = NOW()
            WHERE user_id = $1 AND archived = FALSE AND week_start < $2
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_status_completed_at_invariant() {
        let now = Utc::now();
        assert_eq!(TaskStatus::Completed.completed_at(now), Some(now));
        assert_eq!(TaskStatus::Pending.completed_at(now), None);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"completed\"").unwrap(),
            TaskStatus::Completed
        );
    }

    #[test]
    fn test_update_task_default_is_noop_merge() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.priority.is_none());
        assert!(update.status.is_none());
    }

    // Integration tests for database operations are in taskflow-api/tests/
}
