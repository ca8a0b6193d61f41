/// Authentication utilities
///
/// This module provides the authentication primitives for TaskFlow:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed bearer tokens carrying user identity
/// - [`middleware`]: Axum middleware gating authenticated routes
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::password::{hash_password, verify_password};
/// use taskflow_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "alice".to_string(), "alice@example.com".to_string());
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
