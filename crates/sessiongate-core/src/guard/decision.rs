use tracing::debug;

use super::RouteRequirement;
use crate::session::{SessionAccessor, SessionState};

/// Outcome of a navigation check. There is deliberately no "forbidden"
/// variant: a missing session and a role mismatch look the same to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a navigation was turned away. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denial {
    NoSession,
    NoUser,
    RoleMismatch,
}

fn evaluate(requirement: &RouteRequirement, session: &SessionState) -> Result<(), Denial> {
    if !requirement.needs_auth() {
        return Ok(());
    }
    let record = session.record().ok_or(Denial::NoSession)?;
    let user = record.user.as_ref().ok_or(Denial::NoUser)?;
    match requirement.role {
        Some(ref role) if !role.matches(user.role()) => Err(Denial::RoleMismatch),
        _ => Ok(()),
    }
}

/// Decide whether a navigation to a view with `requirement` may proceed for
/// the given session snapshot.
pub fn decide(requirement: &RouteRequirement, session: &SessionState, login_path: &str) -> Decision {
    match evaluate(requirement, session) {
        Ok(()) => Decision::Allow,
        Err(denial) => {
            debug!(?denial, required_role = ?requirement.role, "Navigation redirected to login");
            Decision::RedirectTo(login_path.to_string())
        }
    }
}

/// Pre-navigation hook: reads one session snapshot per navigation attempt.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionAccessor,
    login_path: String,
}

impl RouteGuard {
    pub fn new(session: SessionAccessor, login_path: impl Into<String>) -> Self {
        Self {
            session,
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn decide(&self, requirement: &RouteRequirement, session: &SessionState) -> Decision {
        decide(requirement, session, &self.login_path)
    }

    pub fn check(&self, requirement: &RouteRequirement) -> Decision {
        // Public views never touch storage
        if !requirement.needs_auth() {
            return Decision::Allow;
        }
        self.decide(requirement, &self.session.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Role;
    use crate::session::{SessionRecord, SESSION_KEY};
    use crate::storage::{MemoryStorage, SessionStorage};

    const LOGIN: &str = "/login";

    fn present(raw: &str) -> SessionState {
        SessionState::Present(SessionRecord::parse(raw).expect("valid record"))
    }

    fn redirect() -> Decision {
        Decision::RedirectTo(LOGIN.to_string())
    }

    fn sessions() -> Vec<SessionState> {
        vec![
            SessionState::Absent,
            present("{}"),
            present(r#"{"token":"t1"}"#),
            present(r#"{"token":"t1","user":{}}"#),
            present(r#"{"token":"t1","user":{"role":"user"}}"#),
            present(r#"{"token":"t1","user":{"role":"admin"}}"#),
            present(r#"{"user":"admin"}"#),
        ]
    }

    #[test]
    fn test_public_views_always_allowed() {
        for session in sessions() {
            assert_eq!(decide(&RouteRequirement::public(), &session, LOGIN), Decision::Allow);
        }
    }

    #[test]
    fn test_authenticated_views_need_a_user() {
        let requirement = RouteRequirement::authenticated();
        for session in sessions() {
            let expected = if session.user().is_some() {
                Decision::Allow
            } else {
                redirect()
            };
            assert_eq!(decide(&requirement, &session, LOGIN), expected, "{session:?}");
        }
    }

    #[test]
    fn test_role_views_need_matching_role() {
        for role in [Role::admin(), Role::user()] {
            let requirement = RouteRequirement::with_role(role.clone());
            for session in sessions() {
                let matches = session.user().and_then(|u| u.role()) == Some(role.as_str());
                let expected = if matches { Decision::Allow } else { redirect() };
                assert_eq!(decide(&requirement, &session, LOGIN), expected, "{session:?}");
            }
        }
    }

    #[test]
    fn test_role_without_requires_auth_still_requires_session() {
        let requirement = RouteRequirement {
            requires_auth: false,
            role: Some(Role::admin()),
        };
        assert_eq!(decide(&requirement, &SessionState::Absent, LOGIN), redirect());
    }

    #[test]
    fn test_role_comparison_is_case_sensitive() {
        let session = present(r#"{"token":"t1","user":{"role":"Admin"}}"#);
        let requirement = RouteRequirement::with_role(Role::admin());
        assert_eq!(decide(&requirement, &session, LOGIN), redirect());
    }

    #[test]
    fn test_token_is_not_required_for_navigation() {
        let session = present(r#"{"user":{"role":"user"}}"#);
        let requirement = RouteRequirement::with_role(Role::user());
        assert_eq!(decide(&requirement, &session, LOGIN), Decision::Allow);
    }

    #[test]
    fn test_decide_is_idempotent() {
        let requirement = RouteRequirement::with_role(Role::admin());
        for session in sessions() {
            let first = decide(&requirement, &session, LOGIN);
            let second = decide(&requirement, &session, LOGIN);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_guard_uses_configured_login_path() {
        let guard = RouteGuard::new(
            SessionAccessor::from_storage(MemoryStorage::new()),
            "/signin",
        );
        assert_eq!(
            guard.check(&RouteRequirement::authenticated()),
            Decision::RedirectTo("/signin".to_string())
        );
        assert!(guard.check(&RouteRequirement::public()).is_allowed());
    }

    #[test]
    fn test_guard_reads_session_on_every_check() {
        let storage = MemoryStorage::new();
        let guard = RouteGuard::new(SessionAccessor::from_storage(storage.clone()), LOGIN);
        let requirement = RouteRequirement::with_role(Role::user());
        assert_eq!(guard.check(&requirement), redirect());

        storage
            .set(SESSION_KEY, r#"{"token":"t1","user":{"role":"user"}}"#)
            .unwrap();
        assert_eq!(guard.check(&requirement), Decision::Allow);

        storage.set(SESSION_KEY, "garbage").unwrap();
        assert_eq!(guard.check(&requirement), redirect());
    }
}
