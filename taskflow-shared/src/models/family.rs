/// Family model, membership, and invitation codes
///
/// A family is created by exactly one user, who becomes its permanent
/// leader and is auto-enrolled as its first member. Other users join by
/// redeeming the family's invitation code. A user belongs to at most one
/// family at a time; that invariant is carried by the UNIQUE constraint on
/// `family_members.user_id`, and a violated insert is the authoritative
/// conflict signal (no check-then-act SELECT).
///
/// Invitation codes are 6 random base-36 uppercase characters. Generation
/// does not guarantee uniqueness; [`Family::create`] retries with a fresh
/// code when the unique constraint on `invitation_code` rejects one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE families (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     invitation_code VARCHAR(6) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE family_members (
///     family_id UUID NOT NULL REFERENCES families(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (family_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Character set for invitation codes (base-36, uppercase)
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of an invitation code
pub const CODE_LENGTH: usize = 6;

/// Attempts before giving up on invitation-code collisions
const CODE_RETRIES: usize = 5;

/// Generates a 6-character base-36 uppercase invitation code
///
/// Uniqueness is not guaranteed here; the `invitation_code` unique
/// constraint enforces it at insert time.
pub fn generate_invitation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Family model representing a household group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Family {
    /// Unique family ID
    pub id: Uuid,

    /// Family name
    pub name: String,

    /// The user who created the family; permanent leader
    pub created_by: Uuid,

    /// Code other users redeem to join
    pub invitation_code: String,

    /// When the family was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamily {
    /// Family name (trimmed, validated non-empty)
    pub name: String,

    /// Creating user, enrolled as leader-member
    pub created_by: Uuid,
}

/// Membership relation between a user and their family
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FamilyMember {
    /// Family ID
    pub family_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

/// Member row joined with user identity, for member listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FamilyMemberInfo {
    /// User ID
    pub user_id: Uuid,

    /// Member's username
    pub username: String,

    /// Member's email
    pub email: String,

    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

/// Checks whether an error is a unique violation on the named constraint
fn violates_constraint(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .constraint()
            .map(|c| c.contains(constraint))
            .unwrap_or(false),
        _ => false,
    }
}

impl Family {
    /// Creates a family with its leader membership, atomically
    ///
    /// The family insert and the creator's membership insert run in one
    /// transaction. Invitation-code collisions are retried with a fresh
    /// code; a violated membership constraint (the creator already belongs
    /// to a family) rolls the family insert back and surfaces as the
    /// database error for the API layer to translate.
    pub async fn create(pool: &PgPool, data: CreateFamily) -> Result<Self, sqlx::Error> {
        let mut last_err = None;

        for _ in 0..CODE_RETRIES {
            let code = generate_invitation_code();
            let mut tx = pool.begin().await?;

            let inserted = sqlx::query_as::<_, Family>(
                r#"
                INSERT INTO families (name, created_by, invitation_code)
                VALUES ($1, $2, $3)
                RETURNING id, name, created_by, invitation_code, created_at
                "#,
            )
            .bind(&data.name)
            .bind(data.created_by)
            .bind(&code)
            .fetch_one(&mut *tx)
            .await;

            let family = match inserted {
                Ok(family) => family,
                Err(e) if violates_constraint(&e, "invitation_code") => {
                    // Collision with an existing code: roll back and retry.
                    tx.rollback().await?;
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            sqlx::query(
                r#"
                INSERT INTO family_members (family_id, user_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(family.id)
            .bind(data.created_by)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(family);
        }

        Err(last_err.unwrap_or_else(|| {
            sqlx::Error::Protocol("invitation code generation retries exhausted".into())
        }))
    }

    /// Finds the family a user belongs to, if any
    pub async fn find_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            SELECT f.id, f.name, f.created_by, f.invitation_code, f.created_at
            FROM families f
            JOIN family_members fm ON fm.family_id = f.id
            WHERE fm.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(family)
    }

    /// Finds a family by invitation code
    pub async fn find_by_invitation_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let family = sqlx::query_as::<_, Family>(
            r#"
            SELECT id, name, created_by, invitation_code, created_at
            FROM families
            WHERE invitation_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(family)
    }

    /// Checks whether a user is this family's leader
    pub fn is_leader(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// Deletes a family (cascades to memberships and family tasks)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl FamilyMember {
    /// Enrolls a user into a family
    ///
    /// The UNIQUE constraint on `user_id` rejects users who already belong
    /// to a family; callers translate that violation to a conflict.
    pub async fn create(
        pool: &PgPool,
        family_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, FamilyMember>(
            r#"
            INSERT INTO family_members (family_id, user_id)
            VALUES ($1, $2)
            RETURNING family_id, user_id, joined_at
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a user belongs to a given family
    pub async fn is_member(
        pool: &PgPool,
        family_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM family_members
                WHERE family_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists a family's members with their user identity
    pub async fn list_with_users(
        pool: &PgPool,
        family_id: Uuid,
    ) -> Result<Vec<FamilyMemberInfo>, sqlx::Error> {
        let members = sqlx::query_as::<_, FamilyMemberInfo>(
            r#"
            SELECT fm.user_id, u.username, u.email, fm.joined_at
            FROM family_members fm
            JOIN users u ON u.id = fm.user_id
            WHERE fm.family_id = $1
            ORDER BY fm.joined_at ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}
