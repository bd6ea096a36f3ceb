use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::Role;

/// Extracts and verifies the bearer token, attaching identity and role to
/// the request. Handlers that need a specific role call `require_role`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::Unauthorized { required })
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AuthError::Unauthenticated)?;

        let claims = keys.verify(token)?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_role_accepts_matching_role() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Teacher,
        };
        assert!(user.require_role(Role::Teacher).is_ok());
    }

    #[test]
    fn require_role_rejects_mismatch() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Student,
        };
        let err = user.require_role(Role::Teacher).unwrap_err();
        assert!(matches!(
            err,
            AuthError::Unauthorized {
                required: Role::Teacher
            }
        ));
    }
}
