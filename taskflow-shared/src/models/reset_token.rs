/// Password reset token model
///
/// One active token per user: requesting a reset upserts the row, replacing
/// any previous token. Tokens expire one hour after issuance. Consuming a
/// token (the actual password change) is handled by the frontend flow and
/// is out of scope here; expired rows are simply replaced on the next
/// request.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE password_reset_tokens (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     token VARCHAR(64) NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Validity window for a reset token
const TOKEN_TTL_HOURS: i64 = 1;

/// Password reset token, one per user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordResetToken {
    /// User the token belongs to
    pub user_id: Uuid,

    /// Opaque reset token (64 hex chars)
    pub token: String,

    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

/// Generates a 64-character hex reset token from 32 random bytes
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl PasswordResetToken {
    /// Issues a token for a user, replacing any existing one
    pub async fn upsert(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);

        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
            RETURNING user_id, token, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Finds a user's current token
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT user_id, token, expires_at, created_at
            FROM password_reset_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Checks whether the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
