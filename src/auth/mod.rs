use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod reset;

pub use error::AuthError;
pub use extractors::AuthUser;
pub use repo_types::{Role, User};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
