/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, forgot-password)
/// - `tasks`: Personal task CRUD and archival
/// - `family`: Family groups, membership, and family tasks
/// - `dashboard`: Stats and analytics rollups

pub mod auth;
pub mod dashboard;
pub mod family;
pub mod health;
pub mod tasks;
