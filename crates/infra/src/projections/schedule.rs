//! Schedule projection: the calendar read model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::CourseId;
use campus_events::EventEnvelope;
use campus_scheduling::{
    ScheduleEventCancelled, ScheduleEventCreated, ScheduleEventEvent, ScheduleEventId,
    ScheduleEventKind,
};

use crate::read_model::ReadStore;

/// Calendar entry read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventReadModel {
    pub event_id: ScheduleEventId,
    pub course_id: CourseId,
    pub title: String,
    pub kind: ScheduleEventKind,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub cancelled: bool,
}

/// Projection that maintains the calendar.
pub struct ScheduleProjection<S> {
    store: S,
}

impl<S> ScheduleProjection<S>
where
    S: ReadStore<ScheduleEventId, ScheduleEventReadModel>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<serde_json::Value>,
    ) -> Result<(), anyhow::Error> {
        if envelope.aggregate_type() != "scheduling.event" {
            return Ok(());
        }

        let event: ScheduleEventEvent = serde_json::from_value(envelope.payload().clone())?;

        match event {
            ScheduleEventEvent::Created(e) => self.apply_created(e),
            ScheduleEventEvent::Cancelled(e) => self.apply_cancelled(e),
        }

        Ok(())
    }

    fn apply_created(&self, e: ScheduleEventCreated) {
        let model = ScheduleEventReadModel {
            event_id: e.event_id,
            course_id: e.course_id,
            title: e.title,
            kind: e.kind,
            starts_at: e.starts_at,
            duration_minutes: e.duration_minutes,
            cancelled: false,
        };
        self.store.upsert(e.event_id, model);
    }

    fn apply_cancelled(&self, e: ScheduleEventCancelled) {
        if let Some(mut model) = self.store.get(&e.event_id) {
            model.cancelled = true;
            self.store.upsert(e.event_id, model);
        }
    }

    /// Get a single calendar entry.
    pub fn get(&self, event_id: &ScheduleEventId) -> Option<ScheduleEventReadModel> {
        self.store.get(event_id)
    }

    /// Active (non-cancelled) entries in the given window, ordered by start.
    pub fn list_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<ScheduleEventReadModel> {
        let mut events: Vec<_> = self
            .store
            .list()
            .into_iter()
            .filter(|e| !e.cancelled)
            .filter(|e| from.is_none_or(|f| e.starts_at >= f))
            .filter(|e| to.is_none_or(|t| e.starts_at <= t))
            .collect();
        events.sort_by_key(|e| e.starts_at);
        events
    }
}
