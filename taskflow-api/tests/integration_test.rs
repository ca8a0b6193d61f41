/// Integration tests for the TaskFlow API
///
/// These tests drive the full router against a real database:
/// - Registration and login
/// - Personal task lifecycle (create → complete → archive)
/// - Cross-user isolation
/// - Family creation, joining, and leader-gated tasks
/// - Dashboard rollups

mod common;

use axum::http::StatusCode;
use chrono::Days;
use common::{body_json, json_request, spawn_user, TestContext};
use serde_json::json;
use taskflow_shared::week::current_week_start;
use tower::Service as _;

/// Full end-to-end personal task lifecycle
#[tokio::test]
async fn test_register_login_and_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    // Register a brand-new user through the API
    let email = format!("e2e-{}@example.com", uuid::Uuid::new_v4().simple());
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": format!("e2e-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
                "email": email,
                "password": "secret123"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let registered = body_json(response).await;
    assert!(registered["token"].is_string());

    // Login returns a fresh valid token
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "secret123" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let token = login["token"].as_str().unwrap().to_string();

    // Create a task
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({ "title": "Buy milk" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], 1);
    assert_eq!(task["week_start"], current_week_start().to_string());
    assert!(task["completed_at"].is_null());
    let task_id = task["id"].as_str().unwrap().to_string();

    // It shows up in the active list
    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "Buy milk");

    // Complete it; completed_at gets stamped
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            Some(&token),
            Some(json!({ "status": "completed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "completed");
    assert!(updated["completed_at"].is_string());
    // Merge semantics: the title survived a status-only update
    assert_eq!(updated["title"], "Buy milk");

    // Archiving now is a no-op: the task belongs to the current week
    let response = ctx
        .app
        .clone()
        .call(json_request("POST", "/api/tasks/archive", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let archive = body_json(response).await;
    assert_eq!(archive["archived_count"], 0);

    // Backdate the task three weeks; now it qualifies
    let old_week = current_week_start() - Days::new(21);
    sqlx::query("UPDATE tasks SET week_start = $1 WHERE id = $2::uuid")
        .bind(old_week)
        .bind(&task_id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request("POST", "/api/tasks/archive", Some(&token), None))
        .await
        .unwrap();
    let archive = body_json(response).await;
    assert_eq!(archive["archived_count"], 1);

    // Archived tasks disappear from the active list
    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", Some(&token), None))
        .await
        .unwrap();
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 0);

    // Re-running the archive stays idempotent
    let response = ctx
        .app
        .clone()
        .call(json_request("POST", "/api/tasks/archive", Some(&token), None))
        .await
        .unwrap();
    let archive = body_json(response).await;
    assert_eq!(archive["archived_count"], 0);

    // Clean up the registered user (cascades the archived task)
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Missing and invalid credentials are rejected
#[tokio::test]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", Some("garbage"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Task title validation
#[tokio::test]
async fn test_task_validation() {
    let ctx = TestContext::new().await.unwrap();

    for body in [json!({}), json!({ "title": "   " })] {
        let response = ctx
            .app
            .clone()
            .call(json_request("POST", "/api/tasks", Some(&ctx.token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await;
        assert_eq!(error["error"], "Task title is required");
    }

    ctx.cleanup().await.unwrap();
}

/// One user's tasks are invisible to another user
#[tokio::test]
async fn test_task_isolation_between_users() {
    let ctx = TestContext::new().await.unwrap();
    let (other, other_token) = spawn_user(&ctx.db, &ctx.config.jwt.secret).await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/tasks",
            Some(&ctx.token),
            Some(json!({ "title": "Private task" })),
        ))
        .await
        .unwrap();
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // The other user can neither update nor delete it
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            Some(&other_token),
            Some(json!({ "title": "Hijacked" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "DELETE",
            &format!("/api/tasks/{}", task_id),
            Some(&other_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // And the owner still sees the original title
    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", Some(&ctx.token), None))
        .await
        .unwrap();
    let tasks = body_json(response).await;
    assert_eq!(tasks[0]["title"], "Private task");

    taskflow_shared::models::user::User::delete(&ctx.db, other.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Duplicate registration is rejected with 400
#[tokio::test]
async fn test_duplicate_registration() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": ctx.user.username,
                "email": ctx.user.email,
                "password": "secret123"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["error"], "User already exists with this email or username");

    ctx.cleanup().await.unwrap();
}

/// Login failures use the same message for unknown email and bad password
#[tokio::test]
async fn test_login_does_not_enumerate_accounts() {
    let ctx = TestContext::new().await.unwrap();

    let attempts = [
        json!({ "email": "nobody@example.com", "password": "whatever1" }),
        json!({ "email": ctx.user.email, "password": "wrong-password" }),
    ];

    for body in attempts {
        let response = ctx
            .app
            .clone()
            .call(json_request("POST", "/api/auth/login", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = body_json(response).await;
        assert_eq!(error["error"], "Invalid email or password");
    }

    ctx.cleanup().await.unwrap();
}

/// Forgot-password always answers generically
#[tokio::test]
async fn test_forgot_password_is_generic() {
    let ctx = TestContext::new().await.unwrap();

    let expected = "If an account with that email exists, a password reset link has been sent.";

    for email in [ctx.user.email.clone(), "nobody@example.com".to_string()] {
        let response = ctx
            .app
            .clone()
            .call(json_request(
                "POST",
                "/api/auth/forgot-password",
                None,
                Some(json!({ "email": email })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], expected);
    }

    // Missing email is the one hard failure
    let response = ctx
        .app
        .clone()
        .call(json_request("POST", "/api/auth/forgot-password", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A token row was stored for the real user
    let token_row =
        taskflow_shared::models::reset_token::PasswordResetToken::find_by_user(&ctx.db, ctx.user.id)
            .await
            .unwrap();
    assert!(token_row.is_some());
    assert!(!token_row.unwrap().is_expired());

    ctx.cleanup().await.unwrap();
}

/// Family creation, joining, and the one-family-per-user invariant
#[tokio::test]
async fn test_family_membership_flow() {
    let ctx = TestContext::new().await.unwrap();
    let (member, member_token) = spawn_user(&ctx.db, &ctx.config.jwt.secret).await.unwrap();

    // Leader creates a family
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/create",
            Some(&ctx.token),
            Some(json!({ "name": "The Does" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let family = body_json(response).await;
    let code = family["invitation_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);

    // Unknown codes are rejected
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/join",
            Some(&member_token),
            Some(json!({ "invitationCode": "??????" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["error"], "Invalid invitation code");

    // The real code works (case-insensitively)
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/join",
            Some(&member_token),
            Some(json!({ "invitationCode": code.to_lowercase() })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Joining again violates the one-family-per-user invariant
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/join",
            Some(&member_token),
            Some(json!({ "invitationCode": code })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["error"], "You are already a member of a family");

    // So does creating a second family
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/create",
            Some(&member_token),
            Some(json!({ "name": "Splinter group" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Both members appear in the member list
    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/family/members", Some(&ctx.token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let members = body_json(response).await;
    let usernames: Vec<&str> = members
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["username"].as_str().unwrap())
        .collect();
    assert!(usernames.contains(&ctx.user.username.as_str()));
    assert!(usernames.contains(&member.username.as_str()));

    taskflow_shared::models::user::User::delete(&ctx.db, member.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Family task creation is leader-gated; updates are member-wide; deletes
/// are creator-only
#[tokio::test]
async fn test_family_task_authorization() {
    let ctx = TestContext::new().await.unwrap();
    let (member, member_token) = spawn_user(&ctx.db, &ctx.config.jwt.secret).await.unwrap();

    // Set up the family
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/create",
            Some(&ctx.token),
            Some(json!({ "name": "Task testers" })),
        ))
        .await
        .unwrap();
    let family = body_json(response).await;
    let code = family["invitation_code"].as_str().unwrap();

    ctx.app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/join",
            Some(&member_token),
            Some(json!({ "invitationCode": code })),
        ))
        .await
        .unwrap();

    // A non-leader member cannot create family tasks
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/tasks",
            Some(&member_token),
            Some(json!({ "title": "Dishes", "assigned_to": member.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let error = body_json(response).await;
    assert_eq!(error["error"], "Only the family leader can create tasks");

    // The leader can, assigning it to the member
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/api/family/tasks",
            Some(&ctx.token),
            Some(json!({ "title": "Dishes", "assigned_to": member.id, "priority": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["week_start"], current_week_start().to_string());
    let task_id = task["id"].as_str().unwrap().to_string();

    // Any member may update; completing stamps completed_at
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PUT",
            &format!("/api/family/tasks/{}", task_id),
            Some(&member_token),
            Some(json!({ "status": "completed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "completed");
    assert!(updated["completed_at"].is_string());
    assert_eq!(updated["title"], "Dishes");

    // Only the creator may delete
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "DELETE",
            &format!("/api/family/tasks/{}", task_id),
            Some(&member_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "DELETE",
            &format!("/api/family/tasks/{}", task_id),
            Some(&ctx.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    taskflow_shared::models::user::User::delete(&ctx.db, member.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Dashboard stats and analytics reflect the caller's tasks
#[tokio::test]
async fn test_dashboard_rollups() {
    let ctx = TestContext::new().await.unwrap();

    for (title, status, priority) in [
        ("Done chore", "completed", 1),
        ("Open chore", "pending", 2),
        ("Another open chore", "pending", 2),
    ] {
        let response = ctx
            .app
            .clone()
            .call(json_request(
                "POST",
                "/api/tasks",
                Some(&ctx.token),
                Some(json!({ "title": title, "status": status, "priority": priority })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/dashboard/stats", Some(&ctx.token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["currentWeek"]["total_tasks"], 3);
    assert_eq!(stats["currentWeek"]["completed_tasks"], 1);
    assert_eq!(stats["currentWeek"]["pending_tasks"], 2);
    assert_eq!(stats["weeklyData"].as_array().unwrap().len(), 1);
    assert_eq!(
        stats["weeklyData"][0]["week_start"],
        current_week_start().to_string()
    );

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "GET",
            "/api/dashboard/analytics?timeframe=week",
            Some(&ctx.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analytics = body_json(response).await;
    assert_eq!(analytics["timeframe"], "week");
    assert_eq!(analytics["trends"].as_array().unwrap().len(), 1);
    assert_eq!(analytics["trends"][0]["total_tasks"], 3);
    assert_eq!(analytics["trends"][0]["completed_tasks"], 1);

    let priorities = analytics["priorityDistribution"].as_array().unwrap();
    assert_eq!(priorities.len(), 2);
    assert_eq!(priorities[0]["priority"], 1);
    assert_eq!(priorities[0]["completed"], 1);
    assert_eq!(priorities[1]["priority"], 2);
    assert_eq!(priorities[1]["count"], 2);

    ctx.cleanup().await.unwrap();
}

/// Tasks are ordered pending-first, then priority descending
#[tokio::test]
async fn test_task_list_ordering() {
    let ctx = TestContext::new().await.unwrap();

    for (title, status, priority) in [
        ("Low done", "completed", 3),
        ("High open", "pending", 3),
        ("Low open", "pending", 1),
    ] {
        ctx.app
            .clone()
            .call(json_request(
                "POST",
                "/api/tasks",
                Some(&ctx.token),
                Some(json!({ "title": title, "status": status, "priority": priority })),
            ))
            .await
            .unwrap();
    }

    let response = ctx
        .app
        .clone()
        .call(json_request("GET", "/api/tasks", Some(&ctx.token), None))
        .await
        .unwrap();
    let tasks = body_json(response).await;
    let titles: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();

    // Pending before completed, higher priority first among pending
    assert_eq!(titles, vec!["High open", "Low open", "Low done"]);

    ctx.cleanup().await.unwrap();
}
