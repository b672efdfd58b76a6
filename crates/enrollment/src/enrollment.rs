use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::CourseId;
use campus_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ProfileId};
use campus_events::Event;

/// Enrollment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(pub AggregateId);

impl EnrollmentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Enrollment.
///
/// # Invariants
/// - Progress is an integer in [0, 100]; out-of-range values are rejected,
///   not clamped.
/// - Progress of 100 marks the enrollment completed.
/// - Recording progress stamps the last-accessed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    id: EnrollmentId,
    student_id: ProfileId,
    course_id: CourseId,
    progress: u8,
    enrolled_at: Option<DateTime<Utc>>,
    last_accessed_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Enrollment {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: EnrollmentId) -> Self {
        Self {
            id,
            student_id: ProfileId::from_uuid(uuid::Uuid::nil()),
            course_id: CourseId::new(AggregateId::from_uuid(uuid::Uuid::nil())),
            progress: 0,
            enrolled_at: None,
            last_accessed_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> EnrollmentId {
        self.id
    }

    pub fn student_id(&self) -> ProfileId {
        self.student_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_completed(&self) -> bool {
        self.progress == 100
    }

    pub fn last_accessed_at(&self) -> Option<DateTime<Utc>> {
        self.last_accessed_at
    }
}

impl AggregateRoot for Enrollment {
    type Id = EnrollmentId;

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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enroll {
    pub enrollment_id: EnrollmentId,
    pub student_id: ProfileId,
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordProgress {
    pub enrollment_id: EnrollmentId,
    /// New progress percentage, 0..=100.
    pub progress: u8,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentCommand {
    Enroll(Enroll),
    RecordProgress(RecordProgress),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrolled {
    pub enrollment_id: EnrollmentId,
    pub student_id: ProfileId,
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecorded {
    pub enrollment_id: EnrollmentId,
    pub progress: u8,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentEvent {
    Enrolled(StudentEnrolled),
    ProgressRecorded(ProgressRecorded),
}

impl Event for EnrollmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EnrollmentEvent::Enrolled(_) => "enrollment.enrolled",
            EnrollmentEvent::ProgressRecorded(_) => "enrollment.progress_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EnrollmentEvent::Enrolled(e) => e.occurred_at,
            EnrollmentEvent::ProgressRecorded(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Enrollment {
    type Command = EnrollmentCommand;
    type Event = EnrollmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            EnrollmentEvent::Enrolled(e) => {
                self.id = e.enrollment_id;
                self.student_id = e.student_id;
                self.course_id = e.course_id;
                self.progress = 0;
                self.enrolled_at = Some(e.occurred_at);
                self.last_accessed_at = Some(e.occurred_at);
                self.created = true;
            }
            EnrollmentEvent::ProgressRecorded(e) => {
                self.progress = e.progress;
                self.last_accessed_at = Some(e.occurred_at);
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EnrollmentCommand::Enroll(cmd) => {
                if self.created {
                    return Err(DomainError::invariant("already enrolled"));
                }

                Ok(vec![EnrollmentEvent::Enrolled(StudentEnrolled {
                    enrollment_id: cmd.enrollment_id,
                    student_id: cmd.student_id,
                    course_id: cmd.course_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
            EnrollmentCommand::RecordProgress(cmd) => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                if cmd.progress > 100 {
                    return Err(DomainError::validation(
                        "progress must be between 0 and 100",
                    ));
                }

                Ok(vec![EnrollmentEvent::ProgressRecorded(ProgressRecorded {
                    enrollment_id: cmd.enrollment_id,
                    progress: cmd.progress,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn enrolled() -> Enrollment {
        let enrollment_id = EnrollmentId::new(AggregateId::new());
        let mut enrollment = Enrollment::empty(enrollment_id);
        let cmd = EnrollmentCommand::Enroll(Enroll {
            enrollment_id,
            student_id: ProfileId::new(),
            course_id: CourseId::new(AggregateId::new()),
            occurred_at: now(),
        });
        for event in enrollment.handle(&cmd).unwrap() {
            enrollment.apply(&event);
        }
        enrollment
    }

    #[test]
    fn enroll_starts_at_zero_progress() {
        let enrollment = enrolled();
        assert_eq!(enrollment.progress(), 0);
        assert!(!enrollment.is_completed());
        assert!(enrollment.last_accessed_at().is_some());
    }

    #[test]
    fn double_enroll_is_rejected() {
        let enrollment = enrolled();
        let cmd = EnrollmentCommand::Enroll(Enroll {
            enrollment_id: enrollment.id_typed(),
            student_id: enrollment.student_id(),
            course_id: enrollment.course_id(),
            occurred_at: now(),
        });
        assert!(enrollment.handle(&cmd).is_err());
    }

    #[test]
    fn progress_of_100_marks_completed() {
        let mut enrollment = enrolled();
        let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
            enrollment_id: enrollment.id_typed(),
            progress: 100,
            occurred_at: now(),
        });
        for event in enrollment.handle(&cmd).unwrap() {
            enrollment.apply(&event);
        }
        assert!(enrollment.is_completed());
    }

    #[test]
    fn progress_updates_last_accessed() {
        let mut enrollment = enrolled();
        let later = now() + chrono::Duration::hours(2);
        let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
            enrollment_id: enrollment.id_typed(),
            progress: 45,
            occurred_at: later,
        });
        for event in enrollment.handle(&cmd).unwrap() {
            enrollment.apply(&event);
        }
        assert_eq!(enrollment.progress(), 45);
        assert_eq!(enrollment.last_accessed_at(), Some(later));
    }

    #[test]
    fn progress_before_enroll_is_not_found() {
        let enrollment = Enrollment::empty(EnrollmentId::new(AggregateId::new()));
        let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
            enrollment_id: enrollment.id_typed(),
            progress: 10,
            occurred_at: now(),
        });
        assert_eq!(enrollment.handle(&cmd).unwrap_err(), DomainError::NotFound);
    }

    proptest! {
        #[test]
        fn progress_in_range_is_accepted(p in 0u8..=100) {
            let mut enrollment = enrolled();
            let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
                enrollment_id: enrollment.id_typed(),
                progress: p,
                occurred_at: now(),
            });
            for event in enrollment.handle(&cmd).unwrap() {
                enrollment.apply(&event);
            }
            prop_assert_eq!(enrollment.progress(), p);
            prop_assert_eq!(enrollment.is_completed(), p == 100);
        }

        #[test]
        fn progress_out_of_range_is_rejected(p in 101u8..=255) {
            let enrollment = enrolled();
            let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
                enrollment_id: enrollment.id_typed(),
                progress: p,
                occurred_at: now(),
            });
            prop_assert!(enrollment.handle(&cmd).is_err());
        }
    }
}
