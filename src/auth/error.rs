use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::repo_types::Role;

/// Everything the auth surface can fail with.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Username already taken")]
    DuplicateUsername,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Requires role '{required}'")]
    Unauthorized { required: Role },
    #[error("Malformed token")]
    TokenMalformed,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Reset token not found")]
    ResetTokenNotFound,
    #[error("Reset token has expired")]
    ResetTokenExpired,
    #[error("{0}")]
    Validation(String),
    #[error("Storage unavailable")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::TokenMalformed
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            AuthError::ResetTokenNotFound
            | AuthError::ResetTokenExpired
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::StoreUnavailable(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal detail goes to the log, never into the body
        let message = match &self {
            AuthError::StoreUnavailable(e) => {
                error!(error = %e, "credential store unavailable");
                "Service temporarily unavailable".to_string()
            }
            AuthError::Internal(e) => {
                error!(error = %e, "internal auth error");
                "Internal server error".to_string()
            }
            other => {
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    warn!(error = %other, "auth rejection");
                }
                other.to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_variants_are_conflicts() {
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::DuplicateUsername.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn credential_and_token_failures_are_unauthorized() {
        for e in [
            AuthError::InvalidCredentials,
            AuthError::Unauthenticated,
            AuthError::TokenMalformed,
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
        ] {
            assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn role_mismatch_is_forbidden() {
        let e = AuthError::Unauthorized {
            required: Role::Teacher,
        };
        assert_eq!(e.status_code(), StatusCode::FORBIDDEN);
        assert!(e.to_string().contains("teacher"));
    }

    #[test]
    fn reset_token_failures_are_bad_requests() {
        assert_eq!(
            AuthError::ResetTokenNotFound.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::ResetTokenExpired.status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
