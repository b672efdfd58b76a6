//! Session record persistence.
//!
//! The session is a single serialized record under a fixed storage key:
//! read once at startup, written on login, removed on logout.

use std::path::PathBuf;
use std::sync::RwLock;

use campus_auth::{SessionRecord, SessionStore, SessionStoreError};

/// Fixed storage key for the persisted session record.
pub const SESSION_FILE: &str = "session.json";

/// In-memory session store (tests/dev; sessions do not survive restarts).
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    record: RwLock<Option<SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self
            .record
            .read()
            .map_err(|_| SessionStoreError::Unavailable("lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        *self
            .record
            .write()
            .map_err(|_| SessionStoreError::Unavailable("lock poisoned".to_string()))? =
            Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self
            .record
            .write()
            .map_err(|_| SessionStoreError::Unavailable("lock poisoned".to_string()))? = None;
        Ok(())
    }
}

/// File-backed session store: one JSON record at
/// `<state_dir>/session.json`.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStoreError::Unavailable(e.to_string())),
        };

        let record = serde_json::from_str(&contents)
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))?;
        Ok(Some(record))
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionStoreError::Unavailable(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| SessionStoreError::Unavailable(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| SessionStoreError::Unavailable(e.to_string()))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStoreError::Unavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_auth::{Profile, Role};
    use campus_core::ProfileId;
    use chrono::Utc;
    use uuid::Uuid;

    fn record() -> SessionRecord {
        SessionRecord {
            token: Uuid::now_v7(),
            profile: Profile {
                id: ProfileId::new(),
                display_name: "Admin User".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
                avatar_url: None,
                bio: None,
            },
            logged_in_at: Utc::now(),
        }
    }

    fn temp_state_dir() -> PathBuf {
        std::env::temp_dir().join(format!("campus-session-{}", Uuid::now_v7()))
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_state_dir();
        let store = FileSessionStore::new(&dir);

        assert_eq!(store.load().unwrap(), None);

        let record = record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing again is a no-op.
        store.clear().unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_record_is_reported_as_corrupt() {
        let dir = temp_state_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SESSION_FILE), "{not json").unwrap();

        let store = FileSessionStore::new(&dir);
        assert!(matches!(store.load(), Err(SessionStoreError::Corrupt(_))));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);

        let record = record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
