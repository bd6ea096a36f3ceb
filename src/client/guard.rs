use crate::auth::repo_types::Role;
use crate::client::session::{SessionCache, SessionState};

/// What a guarded route should do for the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still resolving; render a neutral pending view.
    Pending,
    Allow,
    RedirectToSignIn,
    /// Role mismatch sends the user to their landing page rather than an
    /// unauthorized error screen.
    RedirectToHome,
}

pub const SIGN_IN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/dashboard";
pub const LANDING_ROUTE: &str = "/";

impl RouteDecision {
    /// Navigation target for redirecting decisions; `None` means stay put.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            RouteDecision::RedirectToSignIn => Some(SIGN_IN_ROUTE),
            RouteDecision::RedirectToHome => Some(HOME_ROUTE),
            RouteDecision::Pending | RouteDecision::Allow => None,
        }
    }
}

/// Decide whether a navigation may proceed. `required_role` of `None` means
/// the page only needs a signed-in user.
pub fn decide(state: SessionState, required_role: Option<Role>) -> RouteDecision {
    match state {
        SessionState::Unknown | SessionState::Loading => RouteDecision::Pending,
        SessionState::Resolved(None) => RouteDecision::RedirectToSignIn,
        SessionState::Resolved(Some(session)) => match required_role {
            Some(required) if session.role != required => RouteDecision::RedirectToHome,
            _ => RouteDecision::Allow,
        },
    }
}

/// Clear the cached session and stored token, returning the public route to
/// navigate to.
pub fn logout(cache: &mut SessionCache) -> &'static str {
    cache.clear();
    LANDING_ROUTE
}
