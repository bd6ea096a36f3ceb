use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

/// Request body for user registration. Role is optional; omitted means
/// `student`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Request body for login. Accepts an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "emailOrUsername", alias = "email")]
    pub email_or_username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(rename = "emailOrUsername", alias = "email")]
    pub email_or_username: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client. No hash, no reset state.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_accepts_email_alias() {
        let body: LoginRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "password": "p"}"#).unwrap();
        assert_eq!(body.email_or_username, "a@x.com");

        let body: LoginRequest =
            serde_json::from_str(r#"{"emailOrUsername": "alice", "password": "p"}"#).unwrap();
        assert_eq!(body.email_or_username, "alice");
    }

    #[test]
    fn register_request_defaults_role_to_none() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{"username": "alice", "email": "a@x.com", "password": "p@ss1234"}"#,
        )
        .unwrap();
        assert!(body.role.is_none());

        let body: RegisterRequest = serde_json::from_str(
            r#"{"username": "t", "email": "t@x.com", "password": "p@ss1234", "role": "teacher"}"#,
        )
        .unwrap();
        assert_eq!(body.role, Some(Role::Teacher));
    }

    #[test]
    fn public_user_serialization_has_no_secrets() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            role: Role::Student,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice@x.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("reset"));
    }
}
