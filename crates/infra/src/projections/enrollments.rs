//! Enrollments projection: per-student course progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::CourseId;
use campus_core::ProfileId;
use campus_enrollment::{EnrollmentEvent, EnrollmentId, ProgressRecorded, StudentEnrolled};
use campus_events::EventEnvelope;

use crate::read_model::ReadStore;

/// Enrollment read model for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentReadModel {
    pub enrollment_id: EnrollmentId,
    pub student_id: ProfileId,
    pub course_id: CourseId,
    pub progress: u8,
    pub completed: bool,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

/// Projection that maintains enrollments.
pub struct EnrollmentsProjection<S> {
    store: S,
}

impl<S> EnrollmentsProjection<S>
where
    S: ReadStore<EnrollmentId, EnrollmentReadModel>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<serde_json::Value>,
    ) -> Result<(), anyhow::Error> {
        if envelope.aggregate_type() != "enrollment.enrollment" {
            return Ok(());
        }

        let event: EnrollmentEvent = serde_json::from_value(envelope.payload().clone())?;

        match event {
            EnrollmentEvent::Enrolled(e) => self.apply_enrolled(e),
            EnrollmentEvent::ProgressRecorded(e) => self.apply_progress(e),
        }

        Ok(())
    }

    fn apply_enrolled(&self, e: StudentEnrolled) {
        let model = EnrollmentReadModel {
            enrollment_id: e.enrollment_id,
            student_id: e.student_id,
            course_id: e.course_id,
            progress: 0,
            completed: false,
            enrolled_at: e.occurred_at,
            last_accessed_at: e.occurred_at,
        };
        self.store.upsert(e.enrollment_id, model);
    }

    fn apply_progress(&self, e: ProgressRecorded) {
        if let Some(mut model) = self.store.get(&e.enrollment_id) {
            model.progress = e.progress;
            model.completed = e.progress == 100;
            model.last_accessed_at = e.occurred_at;
            self.store.upsert(e.enrollment_id, model);
        }
    }

    /// Get a single enrollment by ID.
    pub fn get(&self, enrollment_id: &EnrollmentId) -> Option<EnrollmentReadModel> {
        self.store.get(enrollment_id)
    }

    /// List all enrollments.
    pub fn list(&self) -> Vec<EnrollmentReadModel> {
        self.store.list()
    }

    /// List a student's enrollments.
    pub fn list_for_student(&self, student_id: ProfileId) -> Vec<EnrollmentReadModel> {
        self.list()
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect()
    }

    /// Find the enrollment linking a student to a course, if any.
    pub fn find(&self, student_id: ProfileId, course_id: CourseId) -> Option<EnrollmentReadModel> {
        self.list()
            .into_iter()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
    }
}
