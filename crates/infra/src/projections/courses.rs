//! Course catalog projection.
//!
//! Consumes catalog events and, for the enrolled-student counter, enrollment
//! events as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::{
    CourseCreated, CourseDetailsUpdated, CourseEvent, CourseId, CourseLevel, CourseModule,
    Lesson, LessonAdded, ModuleAdded,
};
use campus_core::ProfileId;
use campus_enrollment::EnrollmentEvent;
use campus_events::EventEnvelope;

use crate::read_model::ReadStore;

/// Course read model for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseReadModel {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor_id: ProfileId,
    pub instructor_name: String,
    pub level: CourseLevel,
    pub duration_weeks: u32,
    pub published: bool,
    pub modules: Vec<CourseModule>,
    pub enrolled_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseReadModel {
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

/// Projection that maintains the course catalog.
pub struct CoursesProjection<S> {
    store: S,
}

impl<S> CoursesProjection<S>
where
    S: ReadStore<CourseId, CourseReadModel>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<serde_json::Value>,
    ) -> Result<(), anyhow::Error> {
        match envelope.aggregate_type() {
            "catalog.course" => {
                let event: CourseEvent = serde_json::from_value(envelope.payload().clone())?;
                self.apply_course_event(event);
            }
            "enrollment.enrollment" => {
                let event: EnrollmentEvent = serde_json::from_value(envelope.payload().clone())?;
                if let EnrollmentEvent::Enrolled(e) = event {
                    self.bump_enrolled_count(e.course_id, e.occurred_at);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn apply_course_event(&self, event: CourseEvent) {
        match event {
            CourseEvent::Created(e) => self.apply_created(e),
            CourseEvent::DetailsUpdated(e) => self.apply_details_updated(e),
            CourseEvent::ModuleAdded(e) => self.apply_module_added(e),
            CourseEvent::LessonAdded(e) => self.apply_lesson_added(e),
            CourseEvent::Published(e) => self.set_published(e.course_id, true, e.occurred_at),
            CourseEvent::Unpublished(e) => self.set_published(e.course_id, false, e.occurred_at),
        }
    }

    fn apply_created(&self, e: CourseCreated) {
        let model = CourseReadModel {
            course_id: e.course_id,
            title: e.title,
            description: e.description,
            instructor_id: e.instructor_id,
            instructor_name: e.instructor_name,
            level: e.level,
            duration_weeks: e.duration_weeks,
            published: false,
            modules: Vec::new(),
            enrolled_count: 0,
            created_at: e.occurred_at,
            updated_at: e.occurred_at,
        };
        self.store.upsert(e.course_id, model);
    }

    fn apply_details_updated(&self, e: CourseDetailsUpdated) {
        if let Some(mut model) = self.store.get(&e.course_id) {
            if let Some(title) = e.title {
                model.title = title;
            }
            if let Some(description) = e.description {
                model.description = description;
            }
            if let Some(level) = e.level {
                model.level = level;
            }
            if let Some(weeks) = e.duration_weeks {
                model.duration_weeks = weeks;
            }
            model.updated_at = e.occurred_at;
            self.store.upsert(e.course_id, model);
        }
    }

    fn apply_module_added(&self, e: ModuleAdded) {
        if let Some(mut model) = self.store.get(&e.course_id) {
            // Idempotent under replay.
            if !model.modules.iter().any(|m| m.id == e.module_id) {
                model.modules.push(CourseModule {
                    id: e.module_id,
                    title: e.title,
                    lessons: Vec::new(),
                });
            }
            model.updated_at = e.occurred_at;
            self.store.upsert(e.course_id, model);
        }
    }

    fn apply_lesson_added(&self, e: LessonAdded) {
        if let Some(mut model) = self.store.get(&e.course_id) {
            if let Some(module) = model.modules.iter_mut().find(|m| m.id == e.module_id) {
                if !module.lessons.iter().any(|l| l.id == e.lesson_id) {
                    module.lessons.push(Lesson {
                        id: e.lesson_id,
                        title: e.title,
                        kind: e.kind,
                        duration_minutes: e.duration_minutes,
                        content: e.content,
                    });
                }
            }
            model.updated_at = e.occurred_at;
            self.store.upsert(e.course_id, model);
        }
    }

    fn set_published(&self, course_id: CourseId, published: bool, at: DateTime<Utc>) {
        if let Some(mut model) = self.store.get(&course_id) {
            model.published = published;
            model.updated_at = at;
            self.store.upsert(course_id, model);
        }
    }

    fn bump_enrolled_count(&self, course_id: CourseId, at: DateTime<Utc>) {
        if let Some(mut model) = self.store.get(&course_id) {
            model.enrolled_count += 1;
            model.updated_at = at;
            self.store.upsert(course_id, model);
        }
    }

    /// Get a single course by ID.
    pub fn get(&self, course_id: &CourseId) -> Option<CourseReadModel> {
        self.store.get(course_id)
    }

    /// List all courses.
    pub fn list(&self) -> Vec<CourseReadModel> {
        self.store.list()
    }

    /// List published courses only (the student-facing catalog).
    pub fn list_published(&self) -> Vec<CourseReadModel> {
        self.list().into_iter().filter(|c| c.published).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_model::InMemoryReadStore;
    use campus_catalog::{CoursePublished, LessonId, LessonKind, ModuleId};
    use campus_core::AggregateId;
    use campus_enrollment::{EnrollmentId, StudentEnrolled};
    use std::sync::Arc;
    use uuid::Uuid;

    fn envelope(aggregate_type: &str, payload: serde_json::Value) -> EventEnvelope<serde_json::Value> {
        EventEnvelope::new(Uuid::now_v7(), AggregateId::new(), aggregate_type, 1, payload)
    }

    fn projection() -> CoursesProjection<Arc<InMemoryReadStore<CourseId, CourseReadModel>>> {
        CoursesProjection::new(Arc::new(InMemoryReadStore::new()))
    }

    fn created(course_id: CourseId) -> CourseEvent {
        CourseEvent::Created(CourseCreated {
            course_id,
            title: "Digital Marketing".to_string(),
            description: "Promotion strategies for the digital world.".to_string(),
            instructor_id: ProfileId::new(),
            instructor_name: "Ana Martinez".to_string(),
            level: CourseLevel::Intermediate,
            duration_weeks: 4,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn course_lifecycle_projects_into_read_model() {
        let projection = projection();
        let course_id = CourseId::new(AggregateId::new());
        let module_id = ModuleId::new();

        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(created(course_id)).unwrap(),
            ))
            .unwrap();
        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(CourseEvent::ModuleAdded(ModuleAdded {
                    course_id,
                    module_id,
                    title: "Basic SEO".to_string(),
                    occurred_at: Utc::now(),
                }))
                .unwrap(),
            ))
            .unwrap();
        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(CourseEvent::LessonAdded(LessonAdded {
                    course_id,
                    module_id,
                    lesson_id: LessonId::new(),
                    title: "On-page optimization".to_string(),
                    kind: LessonKind::Document,
                    duration_minutes: None,
                    content: "On-page optimization content.".to_string(),
                    occurred_at: Utc::now(),
                }))
                .unwrap(),
            ))
            .unwrap();
        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(CourseEvent::Published(CoursePublished {
                    course_id,
                    occurred_at: Utc::now(),
                }))
                .unwrap(),
            ))
            .unwrap();

        let model = projection.get(&course_id).unwrap();
        assert!(model.published);
        assert_eq!(model.lesson_count(), 1);
        assert_eq!(model.modules[0].title, "Basic SEO");
        assert_eq!(projection.list_published().len(), 1);
    }

    #[test]
    fn enrollment_events_bump_the_enrolled_counter() {
        let projection = projection();
        let course_id = CourseId::new(AggregateId::new());

        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(created(course_id)).unwrap(),
            ))
            .unwrap();

        for _ in 0..3 {
            projection
                .apply_envelope(&envelope(
                    "enrollment.enrollment",
                    serde_json::to_value(EnrollmentEvent::Enrolled(StudentEnrolled {
                        enrollment_id: EnrollmentId::new(AggregateId::new()),
                        student_id: ProfileId::new(),
                        course_id,
                        occurred_at: Utc::now(),
                    }))
                    .unwrap(),
                ))
                .unwrap();
        }

        assert_eq!(projection.get(&course_id).unwrap().enrolled_count, 3);
    }

    #[test]
    fn duplicate_module_event_is_idempotent() {
        let projection = projection();
        let course_id = CourseId::new(AggregateId::new());
        let module_id = ModuleId::new();

        projection
            .apply_envelope(&envelope(
                "catalog.course",
                serde_json::to_value(created(course_id)).unwrap(),
            ))
            .unwrap();

        let module_event = serde_json::to_value(CourseEvent::ModuleAdded(ModuleAdded {
            course_id,
            module_id,
            title: "Basic SEO".to_string(),
            occurred_at: Utc::now(),
        }))
        .unwrap();

        projection
            .apply_envelope(&envelope("catalog.course", module_event.clone()))
            .unwrap();
        projection
            .apply_envelope(&envelope("catalog.course", module_event))
            .unwrap();

        assert_eq!(projection.get(&course_id).unwrap().modules.len(), 1);
    }
}
