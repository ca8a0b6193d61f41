/// Family task model and lifecycle operations
///
/// Family tasks mirror personal tasks (week bucketing, completion
/// semantics) but are scoped to a family rather than an owning user. Only
/// the family leader may create them; any member may be the assignee.
/// Updates are open to every member of the task's family, while deletion
/// is restricted to the task's creator.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE family_tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     family_id UUID NOT NULL REFERENCES families(id) ON DELETE CASCADE,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     priority SMALLINT NOT NULL DEFAULT 1 CHECK (priority BETWEEN 1 AND 3),
///     status task_status NOT NULL DEFAULT 'pending',
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     week_start DATE NOT NULL,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::task::TaskStatus;

/// Task scoped to a family, assigned by the leader
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FamilyTask {
    /// Unique task ID
    pub id: Uuid,

    /// Family this task belongs to
    pub family_id: Uuid,

    /// User who created the task (the family leader at creation time)
    pub created_by: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority 1 (low) to 3 (high)
    pub priority: i16,

    /// Completion status
    pub status: TaskStatus,

    /// Member the task is assigned to
    pub assigned_to: Uuid,

    /// Sunday of the week this task belongs to
    pub week_start: NaiveDate,

    /// When the task was completed (null while pending)
    pub completed_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new family task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyTask {
    /// Family the task belongs to
    pub family_id: Uuid,

    /// Creating user (already verified to be the leader)
    pub created_by: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority, defaults to 1
    pub priority: Option<i16>,

    /// Member to assign the task to
    pub assigned_to: Uuid,

    /// Week bucket, normally the current week's Sunday
    pub week_start: NaiveDate,
}

/// Input for updating a family task
///
/// Absent fields keep their stored values, as with personal tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFamilyTask {
    /// New title
    pub title: Option<String>,

    /// New description (empty string clears it)
    pub description: Option<String>,

    /// New priority
    pub priority: Option<i16>,

    /// New status; `completed_at` is recomputed from the result
    pub status: Option<TaskStatus>,

    /// Reassign the task to a different member
    pub assigned_to: Option<Uuid>,
}

impl FamilyTask {
    /// Creates a new family task in pending state
    pub async fn create(pool: &PgPool, data: CreateFamilyTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, FamilyTask>(
            r#"
            INSERT INTO family_tasks (family_id, created_by, title, description,
                                      priority, assigned_to, week_start)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, family_id, created_by, title, description, priority,
                      status, assigned_to, week_start, completed_at,
                      created_at, updated_at
            "#,
        )
        .bind(data.family_id)
        .bind(data.created_by)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority.unwrap_or(1))
        .bind(data.assigned_to)
        .bind(data.week_start)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a family task by ID scoped to a family
    ///
    /// Handlers resolve the caller's family first, so tasks in other
    /// families are indistinguishable from missing ones.
    pub async fn find_by_id_and_family(
        pool: &PgPool,
        id: Uuid,
        family_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, FamilyTask>(
            r#"
            SELECT id, family_id, created_by, title, description, priority,
                   status, assigned_to, week_start, completed_at,
                   created_at, updated_at
            FROM family_tasks
            WHERE id = $1 AND family_id = $2
            "#,
        )
        .bind(id)
        .bind(family_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a family's tasks, pending first
    pub async fn list_by_family(pool: &PgPool, family_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, FamilyTask>(
            r#"
            SELECT id, family_id, created_by, title, description, priority,
                   status, assigned_to, week_start, completed_at,
                   created_at, updated_at
            FROM family_tasks
            WHERE family_id = $1
            ORDER BY status ASC, priority DESC, created_at DESC
            "#,
        )
        .bind(family_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a family task, merging supplied fields over the stored record
    ///
    /// Returns `None` when the task is not in the given family.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        family_id: Uuid,
        data: UpdateFamilyTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(existing) = Self::find_by_id_and_family(pool, id, family_id).await? else {
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
        let assigned_to = data.assigned_to.unwrap_or(existing.assigned_to);
        let completed_at = status.completed_at(Utc::now());

        let task = sqlx::query_as::<_, FamilyTask>(
            r#"
            UPDATE family_tasks
            SET title = $3,
                description = $4,
                priority = $5,
                status = $6,
                assigned_to = $7,
                completed_at = $8,
                updated_at = NOW()
            WHERE id = $1 AND family_id = $2
            RETURNING id, family_id, created_by, title, description, priority,
                      status, assigned_to, week_start, completed_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(family_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(status)
        .bind(assigned_to)
        .bind(completed_at)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a family task, restricted to its creator
    ///
    /// Returns false when no task matched both the ID and the creator, so
    /// a missing task and a permission failure are indistinguishable.
    pub async fn delete_by_creator(
        pool: &PgPool,
        id: Uuid,
        created_by: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM family_tasks WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(created_by)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
