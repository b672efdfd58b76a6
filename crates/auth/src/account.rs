//! Account aggregate for identity management (event-sourced).
//!
//! # Invariants
//! - Email and display name are validated at registration.
//! - Role is fixed at registration; there is no role-change command.
//! - Inactive accounts cannot update their profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{Aggregate, AggregateRoot, DomainError, ProfileId};
use campus_events::Event;

use crate::{Profile, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Account Status
// ─────────────────────────────────────────────────────────────────────────────

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account is active and can authenticate.
    #[default]
    Active,
    /// Account is deactivated and cannot authenticate.
    Inactive,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Inactive => write!(f, "inactive"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Account aggregate for identity management.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: ProfileId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub version: u64,
    pub created: bool,
}

impl Account {
    /// Create an empty, not-yet-registered instance for rehydration.
    pub fn empty(id: ProfileId) -> Self {
        Self {
            id,
            email: String::new(),
            display_name: String::new(),
            role: Role::Student,
            status: AccountStatus::Active,
            avatar_url: None,
            bio: None,
            version: 0,
            created: false,
        }
    }

    /// The identity record this account projects into a session.
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.status == AccountStatus::Inactive {
            return Err(DomainError::invariant("account is inactive"));
        }
        Ok(())
    }
}

impl AggregateRoot for Account {
    type Id = ProfileId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAccount {
    pub profile_id: ProfileId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command to update profile details (settings page).
///
/// `Some` fields are applied; `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub profile_id: ProfileId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command to deactivate an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateAccount {
    pub profile_id: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to reactivate a deactivated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactivateAccount {
    pub profile_id: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

/// All account commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountCommand {
    Register(RegisterAccount),
    UpdateProfile(UpdateProfile),
    Deactivate(DeactivateAccount),
    Reactivate(ReactivateAccount),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event emitted when an account is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRegistered {
    pub profile_id: ProfileId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when profile details change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub profile_id: ProfileId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when an account is deactivated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDeactivated {
    pub profile_id: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when an account is reactivated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountReactivated {
    pub profile_id: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

/// All account events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountEvent {
    Registered(AccountRegistered),
    ProfileUpdated(ProfileUpdated),
    Deactivated(AccountDeactivated),
    Reactivated(AccountReactivated),
}

impl Event for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Registered(_) => "auth.account.registered",
            AccountEvent::ProfileUpdated(_) => "auth.account.profile_updated",
            AccountEvent::Deactivated(_) => "auth.account.deactivated",
            AccountEvent::Reactivated(_) => "auth.account.reactivated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccountEvent::Registered(e) => e.occurred_at,
            AccountEvent::ProfileUpdated(e) => e.occurred_at,
            AccountEvent::Deactivated(e) => e.occurred_at,
            AccountEvent::Reactivated(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Account {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Registered(e) => self.apply_registered(e),
            AccountEvent::ProfileUpdated(e) => self.apply_profile_updated(e),
            AccountEvent::Deactivated(e) => self.apply_deactivated(e),
            AccountEvent::Reactivated(e) => self.apply_reactivated(e),
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::Register(cmd) => self.handle_register(cmd),
            AccountCommand::UpdateProfile(cmd) => self.handle_update_profile(cmd),
            AccountCommand::Deactivate(cmd) => self.handle_deactivate(cmd),
            AccountCommand::Reactivate(cmd) => self.handle_reactivate(cmd),
        }
    }
}

impl Account {
    // ─────────────────────────────────────────────────────────────────────────
    // Command Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_register(&self, cmd: &RegisterAccount) -> Result<Vec<AccountEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("account already exists"));
        }

        if cmd.email.trim().is_empty() || !cmd.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        if cmd.display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }

        Ok(vec![AccountEvent::Registered(AccountRegistered {
            profile_id: cmd.profile_id,
            email: cmd.email.trim().to_lowercase(),
            display_name: cmd.display_name.trim().to_string(),
            role: cmd.role,
            avatar_url: cmd.avatar_url.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_profile(&self, cmd: &UpdateProfile) -> Result<Vec<AccountEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }

        self.ensure_active()?;

        if let Some(name) = &cmd.display_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("display name cannot be empty"));
            }
        }

        if cmd.display_name.is_none() && cmd.avatar_url.is_none() && cmd.bio.is_none() {
            // Nothing to change; emit nothing.
            return Ok(vec![]);
        }

        Ok(vec![AccountEvent::ProfileUpdated(ProfileUpdated {
            profile_id: cmd.profile_id,
            display_name: cmd.display_name.as_deref().map(|s| s.trim().to_string()),
            avatar_url: cmd.avatar_url.clone(),
            bio: cmd.bio.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deactivate(&self, cmd: &DeactivateAccount) -> Result<Vec<AccountEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }

        if self.status == AccountStatus::Inactive {
            return Err(DomainError::invariant("account already inactive"));
        }

        Ok(vec![AccountEvent::Deactivated(AccountDeactivated {
            profile_id: cmd.profile_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reactivate(&self, cmd: &ReactivateAccount) -> Result<Vec<AccountEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }

        if self.status == AccountStatus::Active {
            return Err(DomainError::invariant("account already active"));
        }

        Ok(vec![AccountEvent::Reactivated(AccountReactivated {
            profile_id: cmd.profile_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Appliers
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_registered(&mut self, e: &AccountRegistered) {
        self.id = e.profile_id;
        self.email = e.email.clone();
        self.display_name = e.display_name.clone();
        self.role = e.role;
        self.status = AccountStatus::Active;
        self.avatar_url = e.avatar_url.clone();
        self.bio = None;
        self.created = true;
    }

    fn apply_profile_updated(&mut self, e: &ProfileUpdated) {
        if let Some(name) = &e.display_name {
            self.display_name = name.clone();
        }
        if let Some(url) = &e.avatar_url {
            self.avatar_url = Some(url.clone());
        }
        if let Some(bio) = &e.bio {
            self.bio = Some(bio.clone());
        }
    }

    fn apply_deactivated(&mut self, _e: &AccountDeactivated) {
        self.status = AccountStatus::Inactive;
    }

    fn apply_reactivated(&mut self, _e: &AccountReactivated) {
        self.status = AccountStatus::Active;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn registered(role: Role) -> Account {
        let profile_id = ProfileId::new();
        let mut account = Account::empty(profile_id);
        let cmd = AccountCommand::Register(RegisterAccount {
            profile_id,
            email: "alice@example.com".to_string(),
            display_name: "Alice Smith".to_string(),
            role,
            avatar_url: None,
            occurred_at: now(),
        });
        for event in account.handle(&cmd).unwrap() {
            account.apply(&event);
        }
        account
    }

    #[test]
    fn register_account_success() {
        let profile_id = ProfileId::new();
        let account = Account::empty(profile_id);

        let cmd = AccountCommand::Register(RegisterAccount {
            profile_id,
            email: "  Alice@Example.COM ".to_string(),
            display_name: "Alice Smith".to_string(),
            role: Role::Student,
            avatar_url: None,
            occurred_at: now(),
        });

        let events = account.handle(&cmd).unwrap();
        assert_eq!(events.len(), 1);

        let AccountEvent::Registered(e) = &events[0] else {
            panic!("expected AccountRegistered event");
        };

        assert_eq!(e.email, "alice@example.com");
        assert_eq!(e.display_name, "Alice Smith");
        assert_eq!(e.role, Role::Student);
    }

    #[test]
    fn register_invalid_email() {
        let profile_id = ProfileId::new();
        let account = Account::empty(profile_id);

        let cmd = AccountCommand::Register(RegisterAccount {
            profile_id,
            email: "not-an-email".to_string(),
            display_name: "Alice".to_string(),
            role: Role::Student,
            avatar_url: None,
            occurred_at: now(),
        });

        assert!(account.handle(&cmd).is_err());
    }

    #[test]
    fn register_twice_is_rejected() {
        let account = registered(Role::Student);
        let cmd = AccountCommand::Register(RegisterAccount {
            profile_id: account.id,
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            role: Role::Student,
            avatar_url: None,
            occurred_at: now(),
        });
        assert!(account.handle(&cmd).is_err());
    }

    #[test]
    fn update_profile_applies_selected_fields() {
        let mut account = registered(Role::Instructor);

        let cmd = AccountCommand::UpdateProfile(UpdateProfile {
            profile_id: account.id,
            display_name: Some("Alice S.".to_string()),
            avatar_url: None,
            bio: Some("Teaches web development.".to_string()),
            occurred_at: now(),
        });
        for event in account.handle(&cmd).unwrap() {
            account.apply(&event);
        }

        assert_eq!(account.display_name, "Alice S.");
        assert_eq!(account.bio.as_deref(), Some("Teaches web development."));
        assert_eq!(account.avatar_url, None);
    }

    #[test]
    fn update_with_no_fields_emits_nothing() {
        let account = registered(Role::Student);
        let cmd = AccountCommand::UpdateProfile(UpdateProfile {
            profile_id: account.id,
            display_name: None,
            avatar_url: None,
            bio: None,
            occurred_at: now(),
        });
        assert!(account.handle(&cmd).unwrap().is_empty());
    }

    #[test]
    fn deactivated_account_cannot_update_profile() {
        let mut account = registered(Role::Student);
        let deactivate = AccountCommand::Deactivate(DeactivateAccount {
            profile_id: account.id,
            occurred_at: now(),
        });
        for event in account.handle(&deactivate).unwrap() {
            account.apply(&event);
        }
        assert_eq!(account.status, AccountStatus::Inactive);

        let cmd = AccountCommand::UpdateProfile(UpdateProfile {
            profile_id: account.id,
            display_name: Some("New Name".to_string()),
            avatar_url: None,
            bio: None,
            occurred_at: now(),
        });
        let err = account.handle(&cmd).unwrap_err();
        assert!(err.to_string().contains("inactive"));
    }

    #[test]
    fn reactivate_round_trip() {
        let mut account = registered(Role::Student);

        let deactivate = AccountCommand::Deactivate(DeactivateAccount {
            profile_id: account.id,
            occurred_at: now(),
        });
        for event in account.handle(&deactivate).unwrap() {
            account.apply(&event);
        }

        let reactivate = AccountCommand::Reactivate(ReactivateAccount {
            profile_id: account.id,
            occurred_at: now(),
        });
        for event in account.handle(&reactivate).unwrap() {
            account.apply(&event);
        }

        assert_eq!(account.status, AccountStatus::Active);
    }

    #[test]
    fn deactivate_twice_is_rejected() {
        let mut account = registered(Role::Student);
        let deactivate = AccountCommand::Deactivate(DeactivateAccount {
            profile_id: account.id,
            occurred_at: now(),
        });
        for event in account.handle(&deactivate).unwrap() {
            account.apply(&event);
        }
        assert!(account.handle(&deactivate).is_err());
    }

    #[test]
    fn profile_snapshot_matches_state() {
        let account = registered(Role::Admin);
        let profile = account.profile();
        assert_eq!(profile.id, account.id);
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.email, "alice@example.com");
    }
}
