//! Accounts projection: the user directory read model.
//!
//! Doubles as the [`ProfileDirectory`] used by the login path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_auth::{
    AccountDeactivated, AccountEvent, AccountReactivated, AccountRegistered, AccountStatus,
    DirectoryProfile, Profile, ProfileDirectory, ProfileUpdated, Role,
};
use campus_core::ProfileId;
use campus_events::EventEnvelope;

use crate::read_model::ReadStore;

/// Account read model for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReadModel {
    pub profile_id: ProfileId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountReadModel {
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.profile_id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Projection that maintains the account directory.
pub struct AccountsProjection<S> {
    store: S,
}

impl<S> AccountsProjection<S>
where
    S: ReadStore<ProfileId, AccountReadModel>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<serde_json::Value>,
    ) -> Result<(), anyhow::Error> {
        if envelope.aggregate_type() != "auth.account" {
            return Ok(());
        }

        let event: AccountEvent = serde_json::from_value(envelope.payload().clone())?;

        match event {
            AccountEvent::Registered(e) => self.apply_registered(e),
            AccountEvent::ProfileUpdated(e) => self.apply_profile_updated(e),
            AccountEvent::Deactivated(e) => self.apply_deactivated(e),
            AccountEvent::Reactivated(e) => self.apply_reactivated(e),
        }

        Ok(())
    }

    fn apply_registered(&self, e: AccountRegistered) {
        let model = AccountReadModel {
            profile_id: e.profile_id,
            email: e.email,
            display_name: e.display_name,
            role: e.role,
            status: AccountStatus::Active,
            avatar_url: e.avatar_url,
            bio: None,
            created_at: e.occurred_at,
            updated_at: e.occurred_at,
        };
        self.store.upsert(e.profile_id, model);
    }

    fn apply_profile_updated(&self, e: ProfileUpdated) {
        if let Some(mut model) = self.store.get(&e.profile_id) {
            if let Some(name) = e.display_name {
                model.display_name = name;
            }
            if let Some(url) = e.avatar_url {
                model.avatar_url = Some(url);
            }
            if let Some(bio) = e.bio {
                model.bio = Some(bio);
            }
            model.updated_at = e.occurred_at;
            self.store.upsert(e.profile_id, model);
        }
    }

    fn apply_deactivated(&self, e: AccountDeactivated) {
        if let Some(mut model) = self.store.get(&e.profile_id) {
            model.status = AccountStatus::Inactive;
            model.updated_at = e.occurred_at;
            self.store.upsert(e.profile_id, model);
        }
    }

    fn apply_reactivated(&self, e: AccountReactivated) {
        if let Some(mut model) = self.store.get(&e.profile_id) {
            model.status = AccountStatus::Active;
            model.updated_at = e.occurred_at;
            self.store.upsert(e.profile_id, model);
        }
    }

    /// Get a single account by ID.
    pub fn get(&self, profile_id: &ProfileId) -> Option<AccountReadModel> {
        self.store.get(profile_id)
    }

    /// List all accounts.
    pub fn list(&self) -> Vec<AccountReadModel> {
        self.store.list()
    }

    /// Get an account by email (linear scan over the directory).
    pub fn get_by_email(&self, email: &str) -> Option<AccountReadModel> {
        let normalized = email.trim().to_lowercase();
        self.list().into_iter().find(|a| a.email == normalized)
    }
}

impl<S> ProfileDirectory for AccountsProjection<S>
where
    S: ReadStore<ProfileId, AccountReadModel>,
{
    fn find_by_email(&self, email: &str) -> Option<DirectoryProfile> {
        self.get_by_email(email).map(|model| DirectoryProfile {
            active: model.is_active(),
            profile: model.profile(),
        })
    }
}
