use uuid::Uuid;

use crate::auth::repo_types::Role;

/// Resolved session identity as the client sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

/// Lifecycle of the client's knowledge about the session.
///
/// `Unknown` before anyone has looked, `Loading` while the profile fetch is
/// in flight, `Resolved(None)` once it is known there is no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Loading,
    Resolved(Option<Session>),
}

/// Explicit session context object, passed to whoever needs it. Replaces the
/// browser app's ambient global (auth context + localStorage token).
#[derive(Debug, Default)]
pub struct SessionCache {
    state: SessionState,
    token: Option<String>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Mark the profile fetch as in flight.
    pub fn begin_loading(&mut self) {
        self.state = SessionState::Loading;
    }

    /// Record the outcome of a login or profile fetch.
    pub fn resolve(&mut self, session: Option<Session>, token: Option<String>) {
        self.state = SessionState::Resolved(session);
        self.token = token;
    }

    /// Drop the cached session and stored token.
    pub fn clear(&mut self) {
        self.state = SessionState::Resolved(None);
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown_with_no_token() {
        let cache = SessionCache::new();
        assert_eq!(cache.state(), SessionState::Unknown);
        assert!(cache.token().is_none());
    }

    #[test]
    fn resolve_stores_session_and_token() {
        let mut cache = SessionCache::new();
        cache.begin_loading();
        assert_eq!(cache.state(), SessionState::Loading);

        let session = Session {
            user_id: Uuid::new_v4(),
            role: Role::Student,
        };
        cache.resolve(Some(session), Some("jwt".into()));
        assert_eq!(cache.state(), SessionState::Resolved(Some(session)));
        assert_eq!(cache.token(), Some("jwt"));
    }

    #[test]
    fn clear_resolves_to_no_session() {
        let mut cache = SessionCache::new();
        cache.resolve(
            Some(Session {
                user_id: Uuid::new_v4(),
                role: Role::Teacher,
            }),
            Some("jwt".into()),
        );
        cache.clear();
        assert_eq!(cache.state(), SessionState::Resolved(None));
        assert!(cache.token().is_none());
    }
}
