//! Per-profile notice board (transient UI feedback).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use campus_core::ProfileId;
use campus_notify::{Notice, NoticeId, NoticeKind, NoticeQueue};

/// Holds one [`NoticeQueue`] per profile.
///
/// Expired notices are purged on read, so the board never grows past what
/// the queues retain.
#[derive(Default)]
pub struct NoticeBoard {
    inner: Mutex<HashMap<ProfileId, NoticeQueue>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_info(&self, profile_id: ProfileId, title: impl Into<String>, body: Option<String>) {
        self.push(profile_id, title, body, NoticeKind::Info);
    }

    pub fn push_error(&self, profile_id: ProfileId, title: impl Into<String>, body: Option<String>) {
        self.push(profile_id, title, body, NoticeKind::Error);
    }

    fn push(
        &self,
        profile_id: ProfileId,
        title: impl Into<String>,
        body: Option<String>,
        kind: NoticeKind,
    ) {
        let mut boards = self.lock();
        boards
            .entry(profile_id)
            .or_default()
            .push(title, body, kind, Utc::now());
    }

    /// Currently visible notices for a profile (purging expired ones first).
    pub fn visible(&self, profile_id: ProfileId) -> Vec<Notice> {
        let mut boards = self.lock();
        match boards.get_mut(&profile_id) {
            Some(queue) => {
                queue.purge(Utc::now());
                queue.visible().into_iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Dismiss one notice, or all open notices when `id` is `None`.
    pub fn dismiss(&self, profile_id: ProfileId, id: Option<NoticeId>) {
        let mut boards = self.lock();
        if let Some(queue) = boards.get_mut(&profile_id) {
            queue.dismiss(id, Utc::now());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ProfileId, NoticeQueue>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
