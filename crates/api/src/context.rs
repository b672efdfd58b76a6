use campus_auth::{Profile, Role};
use campus_core::ProfileId;

/// Authenticated session context for a request.
///
/// Inserted by the session middleware; present on all guarded routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    profile: Profile,
}

impl SessionContext {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_id(&self) -> ProfileId {
        self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}
