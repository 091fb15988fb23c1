//! Signed-in session held by the front end.

use crate::guard::{GuardDecision, RoleGuard, SessionState, SessionUser};

/// Bearer token and current-user lookup, passed explicitly to whatever needs
/// them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    state: SessionState,
}

impl Session {
    /// Starts a session for `token`; the user lookup is still outstanding.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            state: SessionState::Checking,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value of the `Authorization` header for API calls.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Ready(user) => Some(user),
            _ => None,
        }
    }

    pub fn user_loaded(&mut self, user: SessionUser) {
        self.state = SessionState::Ready(user);
    }

    /// Records a failed lookup. Without a token there is nothing to retry
    /// with, so the token is dropped on authentication failures.
    pub fn lookup_failed(&mut self, message: impl Into<String>, unauthorized: bool) {
        if unauthorized {
            self.token = None;
        }
        self.state = SessionState::Failed(message.into());
    }

    pub fn sign_out(&mut self) {
        self.token = None;
        self.state = SessionState::Failed("signed out".to_string());
    }

    pub fn decide(&self, guard: &RoleGuard) -> GuardDecision {
        guard.decide(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;

    fn admin() -> SessionUser {
        SessionUser {
            id: "1".into(),
            name: "Admin".into(),
            email: "admin@example.com".into(),
            role_id: Role::Admin.id(),
        }
    }

    #[test]
    fn pages_wait_for_the_user_lookup() {
        let session = Session::with_token("abc");
        let guard = RoleGuard::new(&[Role::Superadmin, Role::Admin], "/");

        assert_eq!(session.decide(&guard), GuardDecision::Pending);
        assert_eq!(session.authorization().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn plain_users_are_redirected_from_admin_pages() {
        let mut session = Session::with_token("abc");
        session.user_loaded(SessionUser {
            role_id: Role::User.id(),
            ..admin()
        });
        let guard = RoleGuard::new(&[Role::Superadmin, Role::Admin], "/");

        assert_eq!(session.decide(&guard), GuardDecision::Redirect("/".into()));
    }

    #[test]
    fn unauthorized_lookup_drops_the_token() {
        let mut session = Session::with_token("abc");
        session.lookup_failed("session expired", true);

        assert!(session.token().is_none());
        assert_eq!(
            session.decide(&RoleGuard::new(Role::ALL, "/")),
            GuardDecision::Error("session expired".into())
        );
    }

    #[test]
    fn loaded_user_is_exposed() {
        let mut session = Session::with_token("abc");
        session.user_loaded(admin());
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("admin@example.com"));
    }
}
