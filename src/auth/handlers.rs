use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
            MessageResponse, PublicUser, RegisterRequest, ResetPasswordRequest,
        },
        error::AuthError,
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{Role, User},
        reset,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/auth/change-password", post(change_password))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2 is CPU-bound; run it off the async reactor so slow hashes never
/// stall unrelated requests.
async fn hash_blocking(plain: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AuthError::Internal(anyhow::anyhow!(e)))?
        .map_err(AuthError::Internal)
}

async fn verify_blocking(plain: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| AuthError::Internal(anyhow::anyhow!(e)))?
        .map_err(AuthError::Internal)
}

fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::Validation("Password too short".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::Validation("Invalid email".into()));
    }
    if payload.username.len() < 3 {
        warn!("username too short");
        return Err(AuthError::Validation("Username too short".into()));
    }
    validate_new_password(&payload.password)?;

    let role = payload.role.unwrap_or(Role::Student);
    let hash = hash_blocking(payload.password).await?;

    // Uniqueness rides on the store's indexes; no read-then-insert race here
    let user = User::create(&state.db, &payload.username, &payload.email, &hash, role).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id, user.role)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    payload.email_or_username = payload.email_or_username.trim().to_string();

    // Unknown account and wrong password answer identically
    let user = match User::find_by_identifier(&state.db, &payload.email_or_username).await? {
        Some(u) => u,
        None => {
            warn!(identifier = %payload.email_or_username, "login unknown account");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let ok = verify_blocking(payload.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(user.id, user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    validate_new_password(&payload.new_password)?;

    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    let ok = verify_blocking(payload.current_password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "change password with wrong current password");
        return Err(AuthError::InvalidCredentials);
    }

    let hash = hash_blocking(payload.new_password).await?;
    User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password updated".into(),
    }))
}

/// Always acknowledges generically, whether or not the account exists.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    payload.email_or_username = payload.email_or_username.trim().to_string();

    if let Some(user) = User::find_by_identifier(&state.db, &payload.email_or_username).await? {
        let token = reset::issue(&state.db, user.id, state.config.reset.ttl_minutes).await?;
        // Delivery failure stays internal; the response must not change
        if let Err(e) = state.mailer.send_password_reset(&user.email, &token).await {
            error!(error = %e, user_id = %user.id, "reset email delivery failed");
        }
        info!(user_id = %user.id, "password reset requested");
    }

    Ok(Json(MessageResponse {
        message: "If an account exists, a reset link was sent".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    validate_new_password(&payload.new_password)?;

    let hash = hash_blocking(payload.new_password).await?;
    let user_id = reset::redeem(&state.db, &payload.token, &hash).await?;

    info!(user_id = %user_id, "password reset completed");
    Ok(Json(MessageResponse {
        message: "Password has been reset".into(),
    }))
}
