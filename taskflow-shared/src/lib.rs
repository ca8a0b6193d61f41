//! # TaskFlow Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the TaskFlow API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication primitives and middleware
//! - `db`: Connection pool and migration runner
//! - `week`: Week-bucket date math for task scheduling and archival
//! - `dashboard`: Read-side aggregation over task rows
//! - `mail`: Outbound email (SMTP or log-only fallback)

pub mod auth;
pub mod dashboard;
pub mod db;
pub mod mail;
pub mod models;
pub mod week;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
