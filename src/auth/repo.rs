use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::repo_types::{Role, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, \
     reset_token_hash, reset_token_expires_at, created_at, updated_at";

impl User {
    /// Find a user by email, case-insensitively.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by either email (case-insensitive) or exact username.
    pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE lower(email) = lower($1) OR username = $1"
        ))
        .bind(identifier)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with a hashed password. Uniqueness is enforced by
    /// the store's indexes, not by a pre-check, so concurrent registrations
    /// cannot both win; the violating constraint tells us which field clashed.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("users_username_key") => AuthError::DuplicateUsername,
                        _ => AuthError::DuplicateEmail,
                    };
                }
            }
            AuthError::from(e)
        })?;
        Ok(user)
    }

    /// Replace the stored password hash.
    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store a reset-token hash and expiry, overwriting any outstanding one.
    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3, \
             updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Atomically redeem a reset token: set the new hash and clear the reset
    /// fields in one conditional update. Returns the user id on success,
    /// `None` if no unexpired token matched. Two concurrent redemptions of
    /// the same token cannot both see a matching row.
    pub async fn redeem_reset_token(
        db: &PgPool,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<Option<Uuid>, AuthError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE users \
             SET password_hash = $2, reset_token_hash = NULL, \
                 reset_token_expires_at = NULL, updated_at = now() \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > now() \
             RETURNING id",
        )
        .bind(token_hash)
        .bind(new_password_hash)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Clear an expired reset token matching the given hash. Returns whether
    /// a stale row existed, distinguishing "expired" from "never issued".
    pub async fn clear_expired_reset_token(db: &PgPool, token_hash: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users \
             SET reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = now() \
             WHERE reset_token_hash = $1 AND reset_token_expires_at <= now()",
        )
        .bind(token_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
