use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many notices may be open at once.
pub const VISIBLE_LIMIT: usize = 1;

/// How long a dismissed notice lingers before it is purged.
pub const REMOVE_DELAY_SECS: i64 = 300;

/// Notice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoticeId(Uuid);

impl NoticeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for NoticeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Severity of a notice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    pub body: Option<String>,
    pub kind: NoticeKind,
    /// Still visible; dismissal closes the notice before removal.
    pub open: bool,
    /// Set when dismissed; the notice is purged once this passes.
    pub remove_at: Option<DateTime<Utc>>,
}

/// Queue of notices for a single recipient.
///
/// Newest first. Pushing past [`VISIBLE_LIMIT`] dismisses the overflow
/// rather than dropping it, so the dismissal is still observable.
#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    notices: Vec<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notice, dismissing whatever falls beyond the visible limit.
    pub fn push(
        &mut self,
        title: impl Into<String>,
        body: Option<String>,
        kind: NoticeKind,
        now: DateTime<Utc>,
    ) -> NoticeId {
        let id = NoticeId::new();
        self.notices.insert(
            0,
            Notice {
                id,
                title: title.into(),
                body,
                kind,
                open: true,
                remove_at: None,
            },
        );

        let overflow: Vec<NoticeId> = self
            .notices
            .iter()
            .filter(|n| n.open)
            .skip(VISIBLE_LIMIT)
            .map(|n| n.id)
            .collect();
        for id in overflow {
            self.close(id, now);
        }

        id
    }

    /// Dismiss one notice, or every open notice when `id` is `None`.
    pub fn dismiss(&mut self, id: Option<NoticeId>, now: DateTime<Utc>) {
        match id {
            Some(id) => self.close(id, now),
            None => {
                let all: Vec<NoticeId> =
                    self.notices.iter().filter(|n| n.open).map(|n| n.id).collect();
                for id in all {
                    self.close(id, now);
                }
            }
        }
    }

    /// Drop notices whose removal deadline has passed.
    pub fn purge(&mut self, now: DateTime<Utc>) {
        self.notices
            .retain(|n| n.remove_at.is_none_or(|at| at > now));
    }

    /// Currently open notices (never more than the visible limit).
    pub fn visible(&self) -> Vec<&Notice> {
        self.notices.iter().filter(|n| n.open).collect()
    }

    /// All retained notices, including dismissed-but-not-yet-purged ones.
    pub fn all(&self) -> &[Notice] {
        &self.notices
    }

    fn close(&mut self, id: NoticeId, now: DateTime<Utc>) {
        if let Some(notice) = self.notices.iter_mut().find(|n| n.id == id) {
            if notice.open {
                notice.open = false;
                notice.remove_at = Some(now + Duration::seconds(REMOVE_DELAY_SECS));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn at_most_one_notice_is_visible() {
        let mut queue = NoticeQueue::new();
        queue.push("Material uploaded", None, NoticeKind::Info, now());
        queue.push("Error", Some("Upload failed".to_string()), NoticeKind::Error, now());

        let visible = queue.visible();
        assert_eq!(visible.len(), VISIBLE_LIMIT);
        assert_eq!(visible[0].title, "Error");

        // The older notice was dismissed, not dropped.
        assert_eq!(queue.all().len(), 2);
        assert!(queue.all().iter().any(|n| !n.open));
    }

    #[test]
    fn dismiss_specific_notice() {
        let mut queue = NoticeQueue::new();
        let id = queue.push("Saved", None, NoticeKind::Info, now());
        queue.dismiss(Some(id), now());

        assert!(queue.visible().is_empty());
        assert_eq!(queue.all()[0].open, false);
        assert!(queue.all()[0].remove_at.is_some());
    }

    #[test]
    fn dismiss_all_without_id() {
        let mut queue = NoticeQueue::new();
        queue.push("One", None, NoticeKind::Info, now());
        queue.push("Two", None, NoticeKind::Info, now());
        queue.dismiss(None, now());

        assert!(queue.visible().is_empty());
    }

    #[test]
    fn dismissed_notices_are_purged_after_the_delay() {
        let t0 = now();
        let mut queue = NoticeQueue::new();
        let id = queue.push("Saved", None, NoticeKind::Info, t0);
        queue.dismiss(Some(id), t0);

        queue.purge(t0 + Duration::seconds(REMOVE_DELAY_SECS - 1));
        assert_eq!(queue.all().len(), 1);

        queue.purge(t0 + Duration::seconds(REMOVE_DELAY_SECS + 1));
        assert!(queue.all().is_empty());
    }

    #[test]
    fn open_notices_survive_purge() {
        let mut queue = NoticeQueue::new();
        queue.push("Still here", None, NoticeKind::Info, now());
        queue.purge(now() + Duration::days(1));
        assert_eq!(queue.visible().len(), 1);
    }

    #[test]
    fn dismissing_twice_keeps_the_first_deadline() {
        let t0 = now();
        let mut queue = NoticeQueue::new();
        let id = queue.push("Saved", None, NoticeKind::Info, t0);
        queue.dismiss(Some(id), t0);
        let first = queue.all()[0].remove_at;

        queue.dismiss(Some(id), t0 + Duration::seconds(60));
        assert_eq!(queue.all()[0].remove_at, first);
    }
}
