use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::CourseId;
use campus_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use campus_events::Event;

/// Calendar entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleEventId(pub AggregateId);

impl ScheduleEventId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ScheduleEventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Kind of calendar entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleEventKind {
    Deadline,
    LiveClass,
    Webinar,
    Quiz,
}

impl ScheduleEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleEventKind::Deadline => "deadline",
            ScheduleEventKind::LiveClass => "live-class",
            ScheduleEventKind::Webinar => "webinar",
            ScheduleEventKind::Quiz => "quiz",
        }
    }
}

impl core::fmt::Display for ScheduleEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleEventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deadline" => Ok(ScheduleEventKind::Deadline),
            "live-class" => Ok(ScheduleEventKind::LiveClass),
            "webinar" => Ok(ScheduleEventKind::Webinar),
            "quiz" => Ok(ScheduleEventKind::Quiz),
            other => Err(DomainError::validation(format!("unknown event kind: {other}"))),
        }
    }
}

/// Aggregate root: a calendar entry tied to a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    id: ScheduleEventId,
    course_id: CourseId,
    title: String,
    kind: ScheduleEventKind,
    starts_at: Option<DateTime<Utc>>,
    duration_minutes: Option<u32>,
    cancelled: bool,
    version: u64,
    created: bool,
}

impl ScheduleEvent {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ScheduleEventId) -> Self {
        Self {
            id,
            course_id: CourseId::new(AggregateId::from_uuid(uuid::Uuid::nil())),
            title: String::new(),
            kind: ScheduleEventKind::Deadline,
            starts_at: None,
            duration_minutes: None,
            cancelled: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ScheduleEventId {
        self.id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn kind(&self) -> ScheduleEventKind {
        self.kind
    }

    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl AggregateRoot for ScheduleEvent {
    type Id = ScheduleEventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands / Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateScheduleEvent {
    pub event_id: ScheduleEventId,
    pub course_id: CourseId,
    pub title: String,
    pub kind: ScheduleEventKind,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelScheduleEvent {
    pub event_id: ScheduleEventId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventCommand {
    Create(CreateScheduleEvent),
    Cancel(CancelScheduleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventCreated {
    pub event_id: ScheduleEventId,
    pub course_id: CourseId,
    pub title: String,
    pub kind: ScheduleEventKind,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventCancelled {
    pub event_id: ScheduleEventId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEventEvent {
    Created(ScheduleEventCreated),
    Cancelled(ScheduleEventCancelled),
}

impl Event for ScheduleEventEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ScheduleEventEvent::Created(_) => "scheduling.event.created",
            ScheduleEventEvent::Cancelled(_) => "scheduling.event.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ScheduleEventEvent::Created(e) => e.occurred_at,
            ScheduleEventEvent::Cancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ScheduleEvent {
    type Command = ScheduleEventCommand;
    type Event = ScheduleEventEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ScheduleEventEvent::Created(e) => {
                self.id = e.event_id;
                self.course_id = e.course_id;
                self.title = e.title.clone();
                self.kind = e.kind;
                self.starts_at = Some(e.starts_at);
                self.duration_minutes = e.duration_minutes;
                self.cancelled = false;
                self.created = true;
            }
            ScheduleEventEvent::Cancelled(_) => {
                self.cancelled = true;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ScheduleEventCommand::Create(cmd) => {
                if self.created {
                    return Err(DomainError::invariant("event already exists"));
                }
                if cmd.title.trim().is_empty() {
                    return Err(DomainError::validation("title cannot be empty"));
                }

                Ok(vec![ScheduleEventEvent::Created(ScheduleEventCreated {
                    event_id: cmd.event_id,
                    course_id: cmd.course_id,
                    title: cmd.title.trim().to_string(),
                    kind: cmd.kind,
                    starts_at: cmd.starts_at,
                    duration_minutes: cmd.duration_minutes,
                    occurred_at: cmd.occurred_at,
                })])
            }
            ScheduleEventCommand::Cancel(cmd) => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                if self.cancelled {
                    return Err(DomainError::invariant("event already cancelled"));
                }

                Ok(vec![ScheduleEventEvent::Cancelled(ScheduleEventCancelled {
                    event_id: cmd.event_id,
                    occurred_at: cmd.occurred_at,
                })])
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

    fn created() -> ScheduleEvent {
        let event_id = ScheduleEventId::new(AggregateId::new());
        let mut event = ScheduleEvent::empty(event_id);
        let cmd = ScheduleEventCommand::Create(CreateScheduleEvent {
            event_id,
            course_id: CourseId::new(AggregateId::new()),
            title: "Final project due".to_string(),
            kind: ScheduleEventKind::Deadline,
            starts_at: now(),
            duration_minutes: None,
            occurred_at: now(),
        });
        for e in event.handle(&cmd).unwrap() {
            event.apply(&e);
        }
        event
    }

    #[test]
    fn create_and_cancel_lifecycle() {
        let mut event = created();
        assert!(!event.is_cancelled());

        let cancel = ScheduleEventCommand::Cancel(CancelScheduleEvent {
            event_id: event.id_typed(),
            occurred_at: now(),
        });
        for e in event.handle(&cancel).unwrap() {
            event.apply(&e);
        }
        assert!(event.is_cancelled());
        assert!(event.handle(&cancel).is_err());
    }

    #[test]
    fn title_is_required() {
        let event_id = ScheduleEventId::new(AggregateId::new());
        let event = ScheduleEvent::empty(event_id);
        let cmd = ScheduleEventCommand::Create(CreateScheduleEvent {
            event_id,
            course_id: CourseId::new(AggregateId::new()),
            title: " ".to_string(),
            kind: ScheduleEventKind::Webinar,
            starts_at: now(),
            duration_minutes: Some(60),
            occurred_at: now(),
        });
        assert!(event.handle(&cmd).is_err());
    }

    #[test]
    fn kinds_serialize_kebab_case() {
        let json = serde_json::to_string(&ScheduleEventKind::LiveClass).unwrap();
        assert_eq!(json, "\"live-class\"");
        assert_eq!(
            "live-class".parse::<ScheduleEventKind>().unwrap(),
            ScheduleEventKind::LiveClass
        );
    }
}
