/// Family group endpoints
///
/// # Endpoints
///
/// - `GET  /api/family/info` - The caller's family
/// - `POST /api/family/create` - Create a family, caller becomes leader
/// - `POST /api/family/join` - Join a family by invitation code
/// - `GET  /api/family/members` - List members of the caller's family
/// - `GET  /api/family/tasks` - List the family's tasks
/// - `POST /api/family/tasks` - Create a family task (leader only)
/// - `PUT    /api/family/tasks/:task_id` - Update a family task (any member)
/// - `DELETE /api/family/tasks/:task_id` - Delete a family task (creator only)
///
/// Membership is exclusive: a user belongs to at most one family. That
/// invariant lives in the UNIQUE constraint on `family_members.user_id`;
/// handlers insert and translate the violation instead of pre-checking.

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
    models::{
        family::{CreateFamily, Family, FamilyMember, FamilyMemberInfo},
        family_task::{CreateFamilyTask, FamilyTask, UpdateFamilyTask},
        task::TaskStatus,
    },
    week,
};
use uuid::Uuid;
use validator::Validate;

/// Create family request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFamilyRequest {
    /// Family name (required, at most 100 characters)
    #[validate(length(max = 100, message = "Family name must be less than 100 characters"))]
    pub name: Option<String>,
}

/// Create family response
#[derive(Debug, Serialize)]
pub struct CreateFamilyResponse {
    /// Outcome message
    pub message: String,

    /// New family ID
    pub family_id: Uuid,

    /// Family name
    pub name: String,

    /// Code other users redeem to join
    pub invitation_code: String,
}

/// Join family request
#[derive(Debug, Deserialize)]
pub struct JoinFamilyRequest {
    /// Invitation code to redeem
    #[serde(rename = "invitationCode")]
    pub invitation_code: Option<String>,
}

/// Join family response
#[derive(Debug, Serialize)]
pub struct JoinFamilyResponse {
    /// Outcome message
    pub message: String,

    /// Joined family ID
    pub family_id: Uuid,

    /// Family name
    pub name: String,
}

/// Create family task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFamilyTaskRequest {
    /// Task title (required, at most 200 characters)
    #[validate(length(max = 200, message = "Task title must be less than 200 characters"))]
    pub title: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Priority 1-3, defaults to 1
    #[validate(range(min = 1, max = 3, message = "Priority must be between 1 and 3"))]
    pub priority: Option<i16>,

    /// Member to assign the task to (required)
    pub assigned_to: Option<Uuid>,
}

/// Update family task request
///
/// Absent fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFamilyTaskRequest {
    /// New title (at most 200 characters)
    #[validate(length(max = 200, message = "Task title must be less than 200 characters"))]
    pub title: Option<String>,

    /// New description (empty string clears it)
    pub description: Option<String>,

    /// New priority 1-3
    #[validate(range(min = 1, max = 3, message = "Priority must be between 1 and 3"))]
    pub priority: Option<i16>,

    /// New status
    pub status: Option<TaskStatus>,

    /// Reassign to a different member
    pub assigned_to: Option<Uuid>,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Outcome message
    pub message: String,
}

/// Resolves the caller's family or fails with 404
async fn require_family(state: &AppState, user_id: Uuid) -> Result<Family, ApiError> {
    Family::find_for_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("You are not part of any family".to_string()))
}

/// Returns the caller's family
///
/// # Errors
///
/// - `404 Not Found`: the caller does not belong to a family
pub async fn get_family_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Family>> {
    let family = require_family(&state, auth.user_id).await?;
    Ok(Json(family))
}

/// Creates a family with the caller as leader
///
/// # Errors
///
/// - `400 Bad Request`: missing name, or the caller already belongs to a
///   family (the membership constraint rejects the enrollment)
pub async fn create_family(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFamilyRequest>,
) -> ApiResult<(StatusCode, Json<CreateFamilyResponse>)> {
    req.validate()?;

    let name = req.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Family name is required".to_string()));
    }

    let family = Family::create(
        &state.db,
        CreateFamily {
            name,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(family_id = %family.id, leader = %auth.user_id, "Family created");

    Ok((
        StatusCode::CREATED,
        Json(CreateFamilyResponse {
            message: "Family created successfully".to_string(),
            family_id: family.id,
            name: family.name,
            invitation_code: family.invitation_code,
        }),
    ))
}

/// Joins a family by invitation code
///
/// # Errors
///
/// - `400 Bad Request`: missing or unknown code, or the caller already
///   belongs to a family
pub async fn join_family(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<JoinFamilyRequest>,
) -> ApiResult<Json<JoinFamilyResponse>> {
    let code = req.invitation_code.unwrap_or_default().trim().to_uppercase();
    if code.is_empty() {
        return Err(ApiError::BadRequest(
            "Invitation code is required".to_string(),
        ));
    }

    let family = Family::find_by_invitation_code(&state.db, &code)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid invitation code".to_string()))?;

    // Insert directly; the membership constraint is the duplicate check.
    FamilyMember::create(&state.db, family.id, auth.user_id).await?;

    tracing::info!(family_id = %family.id, user_id = %auth.user_id, "User joined family");

    Ok(Json(JoinFamilyResponse {
        message: "Successfully joined family".to_string(),
        family_id: family.id,
        name: family.name,
    }))
}

/// Lists the members of the caller's family
///
/// # Errors
///
/// - `404 Not Found`: the caller does not belong to a family
pub async fn get_family_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<FamilyMemberInfo>>> {
    let family = require_family(&state, auth.user_id).await?;
    let members = FamilyMember::list_with_users(&state.db, family.id).await?;
    Ok(Json(members))
}

/// Lists the caller's family's tasks
///
/// # Errors
///
/// - `404 Not Found`: the caller does not belong to a family
pub async fn get_family_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<FamilyTask>>> {
    let family = require_family(&state, auth.user_id).await?;
    let tasks = FamilyTask::list_by_family(&state.db, family.id).await?;
    Ok(Json(tasks))
}

/// Creates a family task; leader only
///
/// # Errors
///
/// - `400 Bad Request`: missing title/assignee, or assignee not a member
/// - `403 Forbidden`: the caller is not the family leader (or has no family)
pub async fn create_family_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateFamilyTaskRequest>,
) -> ApiResult<(StatusCode, Json<FamilyTask>)> {
    req.validate()?;

    let title = req.title.unwrap_or_default().trim().to_string();
    let assigned_to = match req.assigned_to {
        Some(assigned_to) if !title.is_empty() => assigned_to,
        _ => {
            return Err(ApiError::BadRequest(
                "Title and assigned user are required".to_string(),
            ))
        }
    };

    // Non-members get the same answer as non-leader members.
    let family = Family::find_for_user(&state.db, auth.user_id)
        .await?
        .filter(|family| family.is_leader(auth.user_id))
        .ok_or_else(|| {
            ApiError::Forbidden("Only the family leader can create tasks".to_string())
        })?;

    if !FamilyMember::is_member(&state.db, family.id, assigned_to).await? {
        return Err(ApiError::BadRequest(
            "Assigned user must be a member of your family".to_string(),
        ));
    }

    let task = FamilyTask::create(
        &state.db,
        CreateFamilyTask {
            family_id: family.id,
            created_by: auth.user_id,
            title,
            description: req
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            priority: req.priority,
            assigned_to,
            week_start: week::current_week_start(),
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, family_id = %family.id, "Family task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Updates a family task; any member of the task's family
///
/// # Errors
///
/// - `404 Not Found`: the task is not in the caller's family
pub async fn update_family_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateFamilyTaskRequest>,
) -> ApiResult<Json<FamilyTask>> {
    req.validate()?;

    let not_found = || ApiError::NotFound("Task not found or update failed".to_string());

    // A caller without a family cannot own any family task.
    let family = Family::find_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    let title = match req.title {
        Some(title) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ApiError::BadRequest("Task title is required".to_string()));
            }
            Some(title)
        }
        None => None,
    };

    let task = FamilyTask::update(
        &state.db,
        task_id,
        family.id,
        UpdateFamilyTask {
            title,
            description: req.description.map(|d| d.trim().to_string()),
            priority: req.priority,
            status: req.status,
            assigned_to: req.assigned_to,
        },
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(Json(task))
}

/// Deletes a family task; creator only
///
/// # Errors
///
/// - `404 Not Found`: no task with this ID created by the caller (missing
///   task and missing permission are deliberately indistinguishable)
pub async fn delete_family_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = FamilyTask::delete_by_creator(&state.db, task_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(
            "Task not found or permission denied".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_family_request_validation() {
        let valid = CreateFamilyRequest {
            name: Some("The Does".to_string()),
        };
        assert!(valid.validate().is_ok());

        let too_long = CreateFamilyRequest {
            name: Some("a".repeat(101)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_join_request_accepts_camel_case_key() {
        let req: JoinFamilyRequest =
            serde_json::from_str(r#"{"invitationCode": "ab12cd"}"#).unwrap();
        assert_eq!(req.invitation_code.as_deref(), Some("ab12cd"));
    }

    #[test]
    fn test_create_family_task_request_validation() {
        let bad_priority = CreateFamilyTaskRequest {
            title: Some("Dishes".to_string()),
            description: None,
            priority: Some(0),
            assigned_to: Some(Uuid::new_v4()),
        };
        assert!(bad_priority.validate().is_err());
    }
}
