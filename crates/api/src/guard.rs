//! Route guard: decides whether a request proceeds, based on session phase
//! and role.
//!
//! Three-state machine per request: while the session manager is loading,
//! guarded routes render a placeholder; unauthenticated requests are
//! redirected to the login path; authorized requests proceed. Privileged
//! views additionally gate on the role with an exhaustive match, so an
//! unhandled role cannot slip through.

use campus_auth::{Role, SessionPhase, SessionRecord};

use crate::context::SessionContext;

/// Path unauthenticated sessions are redirected to.
pub const LOGIN_PATH: &str = "/login";

/// Path under-privileged sessions are redirected to.
pub const ROOT_PATH: &str = "/";

/// Outcome of the authentication guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state is still loading; render a placeholder.
    Placeholder,
    /// No valid session; redirect to the login path.
    RedirectToLogin,
    /// Authorized; proceed with this session context.
    Proceed(SessionContext),
}

/// Evaluate the authentication guard for one request.
pub fn evaluate(phase: SessionPhase, session: Option<SessionRecord>) -> GuardDecision {
    match phase {
        SessionPhase::Loading => GuardDecision::Placeholder,
        SessionPhase::Ready => match session {
            None => GuardDecision::RedirectToLogin,
            Some(record) => GuardDecision::Proceed(SessionContext::new(record.profile)),
        },
    }
}

/// Outcome of a role gate on a privileged view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoleGate {
    Allow,
    /// Authenticated but under-privileged; redirect away.
    RedirectToRoot,
}

/// Gate for admin-only views (user management).
pub fn admin_gate(role: Role) -> RoleGate {
    match role {
        Role::Admin => RoleGate::Allow,
        Role::Instructor | Role::Student => RoleGate::RedirectToRoot,
    }
}

/// Gate for staff views (course authoring, materials upload, calendar
/// management).
pub fn staff_gate(role: Role) -> RoleGate {
    match role {
        Role::Admin | Role::Instructor => RoleGate::Allow,
        Role::Student => RoleGate::RedirectToRoot,
    }
}

/// Gate for student-side actions (enrolling, progress).
pub fn student_gate(role: Role) -> RoleGate {
    match role {
        Role::Student => RoleGate::Allow,
        Role::Admin | Role::Instructor => RoleGate::RedirectToRoot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_auth::Profile;
    use campus_core::ProfileId;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(role: Role) -> SessionRecord {
        SessionRecord {
            token: Uuid::now_v7(),
            profile: Profile {
                id: ProfileId::new(),
                display_name: "Someone".to_string(),
                email: "someone@example.com".to_string(),
                role,
                avatar_url: None,
                bio: None,
            },
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn loading_renders_placeholder_even_with_a_session() {
        assert_eq!(
            evaluate(SessionPhase::Loading, Some(record(Role::Admin))),
            GuardDecision::Placeholder
        );
    }

    #[test]
    fn missing_session_redirects_to_login() {
        assert_eq!(
            evaluate(SessionPhase::Ready, None),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn valid_session_proceeds_with_its_profile() {
        let record = record(Role::Instructor);
        let expected = SessionContext::new(record.profile.clone());
        assert_eq!(
            evaluate(SessionPhase::Ready, Some(record)),
            GuardDecision::Proceed(expected)
        );
    }

    #[test]
    fn admin_gate_admits_exactly_admins() {
        assert_eq!(admin_gate(Role::Admin), RoleGate::Allow);
        assert_eq!(admin_gate(Role::Instructor), RoleGate::RedirectToRoot);
        assert_eq!(admin_gate(Role::Student), RoleGate::RedirectToRoot);
    }

    #[test]
    fn staff_gate_admits_admins_and_instructors() {
        assert_eq!(staff_gate(Role::Admin), RoleGate::Allow);
        assert_eq!(staff_gate(Role::Instructor), RoleGate::Allow);
        assert_eq!(staff_gate(Role::Student), RoleGate::RedirectToRoot);
    }

    #[test]
    fn student_gate_admits_exactly_students() {
        assert_eq!(student_gate(Role::Student), RoleGate::Allow);
        assert_eq!(student_gate(Role::Admin), RoleGate::RedirectToRoot);
        assert_eq!(student_gate(Role::Instructor), RoleGate::RedirectToRoot);
    }
}
