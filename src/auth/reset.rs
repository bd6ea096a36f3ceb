use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::repo_types::User;

const TOKEN_LEN: usize = 48;

/// Generate a fresh reset token. The plaintext goes to the user; only
/// `hash_token` of it is ever persisted.
pub fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a reset token for a user, overwriting any outstanding one so only
/// the most recent request stays redeemable. Returns the plaintext token.
pub async fn issue(db: &PgPool, user_id: Uuid, ttl_minutes: i64) -> Result<String, AuthError> {
    let token = generate_token();
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    User::set_reset_token(db, user_id, &hash_token(&token), expires_at).await?;
    debug!(user_id = %user_id, "reset token issued");
    Ok(token)
}

/// Redeem a reset token against a pre-hashed new password. Single-use: the
/// conditional update in the repo clears the token in the same statement
/// that sets the password, so a second redemption finds nothing.
pub async fn redeem(
    db: &PgPool,
    token: &str,
    new_password_hash: &str,
) -> Result<Uuid, AuthError> {
    let token_hash = hash_token(token);
    if let Some(user_id) = User::redeem_reset_token(db, &token_hash, new_password_hash).await? {
        debug!(user_id = %user_id, "reset token redeemed");
        return Ok(user_id);
    }
    // No live match: expired-and-cleared reads differently from never-issued
    if User::clear_expired_reset_token(db, &token_hash).await? {
        Err(AuthError::ResetTokenExpired)
    } else {
        Err(AuthError::ResetTokenNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_alphanumeric_and_sized() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn hash_token_is_sha256_hex() {
        // Known SHA-256 vector
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token("abc").len(), 64);
    }

    #[test]
    fn hash_token_is_deterministic_and_collision_resistant_in_practice() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
    }

    use crate::auth::repo_types::Role;

    async fn make_user(pool: &PgPool) -> User {
        User::create(pool, "alice", "alice@example.com", "old-hash", Role::Student)
            .await
            .expect("create user")
    }

    #[sqlx::test]
    async fn redeem_is_single_use(pool: PgPool) {
        let user = make_user(&pool).await;
        let token = issue(&pool, user.id, 30).await.expect("issue token");

        let redeemed = redeem(&pool, &token, "new-hash").await.expect("first redeem");
        assert_eq!(redeemed, user.id);

        let stored = User::find_by_id(&pool, user.id)
            .await
            .expect("reload")
            .expect("user exists");
        assert_eq!(stored.password_hash, "new-hash");
        assert!(stored.reset_token_hash.is_none());
        assert!(stored.reset_token_expires_at.is_none());

        // Replaying the same token finds nothing to update
        let err = redeem(&pool, &token, "other-hash").await.unwrap_err();
        assert!(matches!(err, AuthError::ResetTokenNotFound));
        let stored = User::find_by_id(&pool, user.id)
            .await
            .expect("reload")
            .expect("user exists");
        assert_eq!(stored.password_hash, "new-hash");
    }

    #[sqlx::test]
    async fn reissue_invalidates_previous_token(pool: PgPool) {
        let user = make_user(&pool).await;
        let first = issue(&pool, user.id, 30).await.expect("first issue");
        let second = issue(&pool, user.id, 30).await.expect("second issue");

        let err = redeem(&pool, &first, "new-hash").await.unwrap_err();
        assert!(matches!(err, AuthError::ResetTokenNotFound));

        let redeemed = redeem(&pool, &second, "new-hash").await.expect("redeem latest");
        assert_eq!(redeemed, user.id);
    }

    #[sqlx::test]
    async fn expired_token_reports_expired_then_not_found(pool: PgPool) {
        let user = make_user(&pool).await;
        let token = generate_token();
        let past = OffsetDateTime::now_utc() - Duration::minutes(5);
        User::set_reset_token(&pool, user.id, &hash_token(&token), past)
            .await
            .expect("store stale token");

        let err = redeem(&pool, &token, "new-hash").await.unwrap_err();
        assert!(matches!(err, AuthError::ResetTokenExpired));

        // The expiry check cleared the fields; password untouched
        let stored = User::find_by_id(&pool, user.id)
            .await
            .expect("reload")
            .expect("user exists");
        assert_eq!(stored.password_hash, "old-hash");
        assert!(stored.reset_token_hash.is_none());

        let err = redeem(&pool, &token, "new-hash").await.unwrap_err();
        assert!(matches!(err, AuthError::ResetTokenNotFound));
    }
}
