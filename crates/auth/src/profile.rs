use serde::{Deserialize, Serialize};

use campus_core::ProfileId;

use crate::Role;

/// The authenticated identity record driving role-based gating.
///
/// This is the shape held by the session and persisted as the single session
/// record; the full account lifecycle lives in [`crate::Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}
