//! `campus-auth` — identity, roles, and the session boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the session
//! manager talks to persistence through the `SessionStore` and
//! `ProfileDirectory` seams.

pub mod account;
pub mod profile;
pub mod roles;
pub mod session;

pub use account::{
    Account, AccountCommand, AccountDeactivated, AccountEvent, AccountReactivated,
    AccountRegistered, AccountStatus, DeactivateAccount, ProfileUpdated, ReactivateAccount,
    RegisterAccount, UpdateProfile,
};
pub use profile::Profile;
pub use roles::{ParseRoleError, Role};
pub use session::{
    AuthError, DirectoryProfile, ProfileDirectory, SessionManager, SessionPhase, SessionRecord,
    SessionStore, SessionStoreError,
};
