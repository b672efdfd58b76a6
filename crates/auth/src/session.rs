//! Session lifecycle: the owned session object constructed at the
//! application's composition root.
//!
//! The manager is a small state machine:
//!
//! ```text
//! Loading ──initialize()──► Ready { unauthenticated | authorized }
//! ```
//!
//! Persistence and identity lookup go through the [`SessionStore`] and
//! [`ProfileDirectory`] seams, so a real backend can be substituted without
//! touching callers.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Profile, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Persisted record + seams
// ─────────────────────────────────────────────────────────────────────────────

/// The single serialized session record.
///
/// At most one session is active at a time; a later login replaces the
/// current record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: Uuid,
    pub profile: Profile,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session record corrupt: {0}")]
    Corrupt(String),
}

/// Storage for the single session record.
///
/// Read once at startup, written on login, cleared on logout.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError>;
    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
        (**self).load()
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        (**self).save(record)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        (**self).clear()
    }
}

/// A directory entry as seen by the login path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
    pub profile: Profile,
    pub active: bool,
}

/// Identity lookup seam for the login path.
///
/// Lookup is by normalized (trimmed, lowercased) email. A verifying
/// implementation may also check credentials and return `None` on mismatch;
/// the default directory accepts any password for a known account.
pub trait ProfileDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<DirectoryProfile>;
}

impl<D> ProfileDirectory for Arc<D>
where
    D: ProfileDirectory + ?Sized,
{
    fn find_by_email(&self, email: &str) -> Option<DirectoryProfile> {
        (**self).find_by_email(email)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors + phases
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email (credentials are not otherwise verified here).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// A previous login attempt has not finished yet.
    #[error("a login attempt is already in flight")]
    AttemptInFlight,

    /// The manager has not finished its startup bootstrap.
    #[error("session state is still loading")]
    NotReady,

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Bootstrap phase of the session manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// The persisted record has not been read yet.
    Loading,
    /// Bootstrap finished; the session is either authorized or not.
    Ready,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session manager
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    current: Option<SessionRecord>,
    login_in_flight: bool,
}

/// Holds the current profile, derives role predicates, exposes login/logout.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn ProfileDirectory>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, directory: Arc<dyn ProfileDirectory>) -> Self {
        Self {
            store,
            directory,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Loading,
                current: None,
                login_in_flight: false,
            }),
        }
    }

    /// Read the persisted session record once and leave the loading phase.
    ///
    /// A missing or unreadable record yields an unauthenticated session,
    /// never an error.
    pub fn initialize(&self) {
        let restored = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("discarding persisted session: {e}");
                None
            }
        };

        let mut state = self.lock();
        state.current = restored;
        state.phase = SessionPhase::Ready;
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<SessionRecord> {
        self.lock().current.clone()
    }

    /// Resolve a bearer token against the active session.
    pub fn authenticate(&self, token: Uuid) -> Option<SessionRecord> {
        let state = self.lock();
        match state.phase {
            SessionPhase::Loading => None,
            SessionPhase::Ready => state
                .current
                .as_ref()
                .filter(|record| record.token == token)
                .cloned(),
        }
    }

    pub fn is_admin(&self) -> bool {
        match self.current_role() {
            Some(Role::Admin) => true,
            Some(Role::Instructor) | Some(Role::Student) | None => false,
        }
    }

    pub fn is_instructor(&self) -> bool {
        match self.current_role() {
            Some(Role::Instructor) => true,
            Some(Role::Admin) | Some(Role::Student) | None => false,
        }
    }

    /// Authenticate by email and replace the active session.
    ///
    /// The password is accepted as-is for any known, active account; a
    /// verifying [`ProfileDirectory`] is the place to reject it. Failure
    /// leaves the current session untouched.
    pub fn login(&self, email: &str, _password: &str) -> Result<SessionRecord, AuthError> {
        {
            let mut state = self.lock();
            match state.phase {
                SessionPhase::Loading => return Err(AuthError::NotReady),
                SessionPhase::Ready => {}
            }
            if state.login_in_flight {
                return Err(AuthError::AttemptInFlight);
            }
            state.login_in_flight = true;
        }

        let outcome = self.attempt_login(email);

        let mut state = self.lock();
        state.login_in_flight = false;

        match outcome {
            Ok(record) => {
                state.current = Some(record.clone());
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }

    /// Update the profile embedded in the active session (settings changes).
    ///
    /// A no-op when no session is active or the profile belongs to someone
    /// else; the persisted record is rewritten on change.
    pub fn refresh_profile(&self, profile: Profile) -> Result<(), AuthError> {
        let updated = {
            let mut state = self.lock();
            match state.current.as_mut() {
                Some(record) if record.profile.id == profile.id => {
                    record.profile = profile;
                    Some(record.clone())
                }
                _ => None,
            }
        };

        if let Some(record) = updated {
            self.store.save(&record)?;
        }
        Ok(())
    }

    /// Clear in-memory and persisted session state unconditionally.
    pub fn logout(&self) -> Result<(), AuthError> {
        {
            let mut state = self.lock();
            state.current = None;
        }

        self.store.clear()?;
        Ok(())
    }

    fn attempt_login(&self, email: &str) -> Result<SessionRecord, AuthError> {
        let normalized = email.trim().to_lowercase();

        let entry = self
            .directory
            .find_by_email(&normalized)
            .ok_or(AuthError::InvalidCredentials)?;

        if !entry.active {
            return Err(AuthError::AccountInactive);
        }

        let record = SessionRecord {
            token: Uuid::now_v7(),
            profile: entry.profile,
            logged_in_at: Utc::now(),
        };

        // Persist before committing to memory, so a failed save leaves the
        // session unchanged.
        self.store.save(&record)?;
        Ok(record)
    }

    fn current_role(&self) -> Option<Role> {
        self.lock().current.as_ref().map(|r| r.profile.role)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // A poisoned session lock is unrecoverable; the process owns the state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::ProfileId;
    use std::collections::HashMap;
    use std::sync::mpsc;

    fn profile(email: &str, role: Role) -> Profile {
        Profile {
            id: ProfileId::new(),
            display_name: "Test Person".to_string(),
            email: email.to_string(),
            role,
            avatar_url: None,
            bio: None,
        }
    }

    #[derive(Default)]
    struct FakeStore {
        record: Mutex<Option<SessionRecord>>,
        fail_load: bool,
        fail_save: bool,
    }

    impl SessionStore for FakeStore {
        fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
            if self.fail_load {
                return Err(SessionStoreError::Corrupt("bad json".to_string()));
            }
            Ok(self.record.lock().unwrap().clone())
        }

        fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
            if self.fail_save {
                return Err(SessionStoreError::Unavailable("disk full".to_string()));
            }
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(())
        }

        fn clear(&self) -> Result<(), SessionStoreError> {
            *self.record.lock().unwrap() = None;
            Ok(())
        }
    }

    struct FakeDirectory {
        entries: HashMap<String, DirectoryProfile>,
    }

    impl FakeDirectory {
        fn with(entries: Vec<(Profile, bool)>) -> Self {
            Self {
                entries: entries
                    .into_iter()
                    .map(|(p, active)| (p.email.clone(), DirectoryProfile { profile: p, active }))
                    .collect(),
            }
        }
    }

    impl ProfileDirectory for FakeDirectory {
        fn find_by_email(&self, email: &str) -> Option<DirectoryProfile> {
            self.entries.get(email).cloned()
        }
    }

    fn manager(store: FakeStore, directory: FakeDirectory) -> SessionManager {
        SessionManager::new(Arc::new(store), Arc::new(directory))
    }

    #[test]
    fn initialize_restores_persisted_session() {
        let record = SessionRecord {
            token: Uuid::now_v7(),
            profile: profile("admin@example.com", Role::Admin),
            logged_in_at: Utc::now(),
        };
        let store = FakeStore::default();
        *store.record.lock().unwrap() = Some(record.clone());

        let mgr = manager(store, FakeDirectory::with(vec![]));
        assert_eq!(mgr.phase(), SessionPhase::Loading);

        mgr.initialize();

        assert_eq!(mgr.phase(), SessionPhase::Ready);
        assert_eq!(mgr.current(), Some(record));
        assert!(mgr.is_admin());
    }

    #[test]
    fn corrupt_store_yields_unauthenticated_session() {
        let store = FakeStore {
            fail_load: true,
            ..FakeStore::default()
        };
        let mgr = manager(store, FakeDirectory::with(vec![]));
        mgr.initialize();

        assert_eq!(mgr.phase(), SessionPhase::Ready);
        assert_eq!(mgr.current(), None);
    }

    #[test]
    fn login_before_initialize_is_not_ready() {
        let mgr = manager(FakeStore::default(), FakeDirectory::with(vec![]));
        assert_eq!(
            mgr.login("admin@example.com", "x").unwrap_err(),
            AuthError::NotReady
        );
    }

    #[test]
    fn login_known_email_authorizes_and_persists() {
        let store = Arc::new(FakeStore::default());
        let directory =
            FakeDirectory::with(vec![(profile("student@example.com", Role::Student), true)]);
        let mgr = SessionManager::new(store.clone(), Arc::new(directory));
        mgr.initialize();

        // Any password is accepted for a known account.
        let record = mgr.login("  Student@Example.com ", "whatever").unwrap();

        assert_eq!(record.profile.email, "student@example.com");
        assert!(!mgr.is_admin());
        assert!(!mgr.is_instructor());
        assert_eq!(store.record.lock().unwrap().as_ref(), Some(&record));
    }

    #[test]
    fn login_unknown_email_leaves_session_unchanged() {
        let directory =
            FakeDirectory::with(vec![(profile("student@example.com", Role::Student), true)]);
        let mgr = manager(FakeStore::default(), directory);
        mgr.initialize();

        let good = mgr.login("student@example.com", "pw").unwrap();
        let err = mgr.login("nobody@example.com", "pw").unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(mgr.current(), Some(good));
    }

    #[test]
    fn login_inactive_account_is_rejected() {
        let directory =
            FakeDirectory::with(vec![(profile("gone@example.com", Role::Student), false)]);
        let mgr = manager(FakeStore::default(), directory);
        mgr.initialize();

        assert_eq!(
            mgr.login("gone@example.com", "pw").unwrap_err(),
            AuthError::AccountInactive
        );
        assert_eq!(mgr.current(), None);
    }

    #[test]
    fn failed_save_leaves_session_unchanged() {
        let store = FakeStore {
            fail_save: true,
            ..FakeStore::default()
        };
        let directory =
            FakeDirectory::with(vec![(profile("student@example.com", Role::Student), true)]);
        let mgr = manager(store, directory);
        mgr.initialize();

        assert!(matches!(
            mgr.login("student@example.com", "pw"),
            Err(AuthError::Store(_))
        ));
        assert_eq!(mgr.current(), None);
    }

    #[test]
    fn logout_clears_memory_and_store_even_without_session() {
        let store = Arc::new(FakeStore::default());
        let directory =
            FakeDirectory::with(vec![(profile("admin@example.com", Role::Admin), true)]);
        let mgr = SessionManager::new(store.clone(), Arc::new(directory));
        mgr.initialize();

        // No session active: logout is still fine.
        mgr.logout().unwrap();
        assert_eq!(mgr.current(), None);

        mgr.login("admin@example.com", "pw").unwrap();
        assert!(mgr.is_admin());

        mgr.logout().unwrap();
        assert_eq!(mgr.current(), None);
        assert!(store.record.lock().unwrap().is_none());
        assert!(!mgr.is_admin());
    }

    #[test]
    fn refresh_profile_rewrites_the_persisted_record() {
        let store = Arc::new(FakeStore::default());
        let directory =
            FakeDirectory::with(vec![(profile("student@example.com", Role::Student), true)]);
        let mgr = SessionManager::new(store.clone(), Arc::new(directory));
        mgr.initialize();

        let record = mgr.login("student@example.com", "pw").unwrap();

        let mut updated = record.profile.clone();
        updated.display_name = "Renamed".to_string();
        mgr.refresh_profile(updated).unwrap();

        assert_eq!(mgr.current().unwrap().profile.display_name, "Renamed");
        assert_eq!(
            store
                .record
                .lock()
                .unwrap()
                .as_ref()
                .unwrap()
                .profile
                .display_name,
            "Renamed"
        );

        // Someone else's profile does not touch the session.
        let mut foreign = mgr.current().unwrap().profile.clone();
        foreign.id = ProfileId::new();
        foreign.display_name = "Intruder".to_string();
        mgr.refresh_profile(foreign).unwrap();
        assert_eq!(mgr.current().unwrap().profile.display_name, "Renamed");
    }

    #[test]
    fn authenticate_matches_active_token_only() {
        let directory =
            FakeDirectory::with(vec![(profile("student@example.com", Role::Student), true)]);
        let mgr = manager(FakeStore::default(), directory);
        mgr.initialize();

        let record = mgr.login("student@example.com", "pw").unwrap();
        assert_eq!(mgr.authenticate(record.token), Some(record));
        assert_eq!(mgr.authenticate(Uuid::now_v7()), None);
    }

    /// Directory that blocks the first lookup until released (and reports
    /// when the lookup has been entered), to hold a login attempt in flight.
    struct SlowDirectory {
        gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
        entry: DirectoryProfile,
    }

    impl ProfileDirectory for SlowDirectory {
        fn find_by_email(&self, _email: &str) -> Option<DirectoryProfile> {
            if let Some((entered, release)) = self.gate.lock().unwrap().take() {
                let _ = entered.send(());
                let _ = release.recv();
            }
            Some(self.entry.clone())
        }
    }

    #[test]
    fn concurrent_login_attempt_is_blocked() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let directory = SlowDirectory {
            gate: Mutex::new(Some((entered_tx, release_rx))),
            entry: DirectoryProfile {
                profile: profile("student@example.com", Role::Student),
                active: true,
            },
        };
        let mgr = Arc::new(SessionManager::new(
            Arc::new(FakeStore::default()),
            Arc::new(directory),
        ));
        mgr.initialize();

        let first = {
            let mgr = mgr.clone();
            std::thread::spawn(move || mgr.login("student@example.com", "pw"))
        };

        // Wait until the first attempt is parked inside the directory lookup,
        // then a second submit must bounce off the in-flight flag.
        entered_rx.recv().unwrap();
        assert_eq!(
            mgr.login("student@example.com", "pw").unwrap_err(),
            AuthError::AttemptInFlight
        );

        release_tx.send(()).unwrap();
        first.join().unwrap().unwrap();
        assert!(mgr.current().is_some());
    }
}
