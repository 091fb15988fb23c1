//! Role-based page access.
//!
//! [`RoleGuard`] evaluates the current [`SessionState`] against a page's
//! allow-list. The server uses [`ensure_role`] at the top of every service
//! call; the front-end state machines use [`RoleGuard::decide`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::role::Role;

/// Returned when a role is not allowed to perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("role {role_id} is not allowed here")]
pub struct AccessDenied {
    pub role_id: i32,
}

/// Checks `role_id` against `allowed`, returning the resolved role.
///
/// Unknown role identifiers are always denied.
pub fn ensure_role(role_id: i32, allowed: &[Role]) -> Result<Role, AccessDenied> {
    match Role::from_id(role_id) {
        Some(role) if allowed.contains(&role) => Ok(role),
        _ => Err(AccessDenied { role_id }),
    }
}

/// Returns `true` if `role_id` resolves to a role in `allowed`.
pub fn check_role(role_id: i32, allowed: &[Role]) -> bool {
    ensure_role(role_id, allowed).is_ok()
}

/// The signed-in user as seen by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_id: i32,
}

/// Where the current-user lookup stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Checking,
    Ready(SessionUser),
    Failed(String),
}

/// Outcome of evaluating a [`RoleGuard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The user lookup is still running; render nothing.
    Pending,
    Authorized,
    Redirect(String),
    Error(String),
}

/// Per-page allow-list with the location unauthorised users are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    pub allowed: Vec<Role>,
    pub fallback: String,
}

impl RoleGuard {
    pub fn new(allowed: &[Role], fallback: impl Into<String>) -> Self {
        Self {
            allowed: allowed.to_vec(),
            fallback: fallback.into(),
        }
    }

    pub fn decide(&self, state: &SessionState) -> GuardDecision {
        match state {
            SessionState::Checking => GuardDecision::Pending,
            SessionState::Ready(user) if check_role(user.role_id, &self.allowed) => {
                GuardDecision::Authorized
            }
            SessionState::Ready(_) => GuardDecision::Redirect(self.fallback.clone()),
            SessionState::Failed(message) => GuardDecision::Error(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role_id: i32) -> SessionState {
        SessionState::Ready(SessionUser {
            id: "1".into(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            role_id,
        })
    }

    #[test]
    fn ensure_role_resolves_allowed_roles() {
        let allowed = [Role::Superadmin, Role::Admin];
        assert_eq!(ensure_role(2, &allowed), Ok(Role::Admin));
        assert_eq!(ensure_role(3, &allowed), Err(AccessDenied { role_id: 3 }));
        assert!(ensure_role(42, Role::ALL).is_err());
    }

    #[test]
    fn guard_waits_while_checking() {
        let guard = RoleGuard::new(Role::ALL, "/");
        assert_eq!(guard.decide(&SessionState::Checking), GuardDecision::Pending);
    }

    #[test]
    fn disallowed_role_is_redirected() {
        let guard = RoleGuard::new(&[Role::Superadmin, Role::Admin], "/dashboard");
        assert_eq!(guard.decide(&user(1)), GuardDecision::Authorized);
        assert_eq!(
            guard.decide(&user(3)),
            GuardDecision::Redirect("/dashboard".into())
        );
        assert_eq!(
            guard.decide(&user(99)),
            GuardDecision::Redirect("/dashboard".into())
        );
    }

    #[test]
    fn lookup_failure_is_not_retried() {
        let guard = RoleGuard::new(Role::ALL, "/");
        let state = SessionState::Failed("session expired".into());
        assert_eq!(
            guard.decide(&state),
            GuardDecision::Error("session expired".into())
        );
    }
}
