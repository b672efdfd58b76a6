//! Materials projection: uploaded course material directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::{CourseId, LessonId, LessonKind, ModuleId};
use campus_core::ProfileId;
use campus_events::EventEnvelope;
use campus_materials::{MaterialEvent, MaterialId, MaterialUploaded};

use crate::read_model::ReadStore;

/// Material read model for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReadModel {
    pub material_id: MaterialId,
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub file_name: String,
    pub uploaded_by: ProfileId,
    pub uploaded_at: DateTime<Utc>,
}

/// Projection that maintains the material directory.
pub struct MaterialsProjection<S> {
    store: S,
}

impl<S> MaterialsProjection<S>
where
    S: ReadStore<MaterialId, MaterialReadModel>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<serde_json::Value>,
    ) -> Result<(), anyhow::Error> {
        if envelope.aggregate_type() != "materials.material" {
            return Ok(());
        }

        let event: MaterialEvent = serde_json::from_value(envelope.payload().clone())?;

        match event {
            MaterialEvent::Uploaded(e) => self.apply_uploaded(e),
            MaterialEvent::Removed(e) => self.store.remove(&e.material_id),
        }

        Ok(())
    }

    fn apply_uploaded(&self, e: MaterialUploaded) {
        let model = MaterialReadModel {
            material_id: e.material_id,
            course_id: e.course_id,
            module_id: e.module_id,
            lesson_id: e.lesson_id,
            title: e.title,
            description: e.description,
            kind: e.kind,
            file_name: e.file_name,
            uploaded_by: e.uploaded_by,
            uploaded_at: e.occurred_at,
        };
        self.store.upsert(e.material_id, model);
    }

    /// Get a single material by ID.
    pub fn get(&self, material_id: &MaterialId) -> Option<MaterialReadModel> {
        self.store.get(material_id)
    }

    /// List all materials.
    pub fn list(&self) -> Vec<MaterialReadModel> {
        self.store.list()
    }

    /// List materials uploaded by one profile (instructor view).
    pub fn list_for_uploader(&self, uploaded_by: ProfileId) -> Vec<MaterialReadModel> {
        self.list()
            .into_iter()
            .filter(|m| m.uploaded_by == uploaded_by)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_model::InMemoryReadStore;
    use campus_core::AggregateId;
    use campus_materials::MaterialRemoved;
    use std::sync::Arc;
    use uuid::Uuid;

    fn projection() -> MaterialsProjection<Arc<InMemoryReadStore<MaterialId, MaterialReadModel>>> {
        MaterialsProjection::new(Arc::new(InMemoryReadStore::new()))
    }

    fn envelope(event: &MaterialEvent) -> EventEnvelope<serde_json::Value> {
        EventEnvelope::new(
            Uuid::now_v7(),
            AggregateId::new(),
            "materials.material",
            1,
            serde_json::to_value(event).unwrap(),
        )
    }

    fn uploaded(material_id: MaterialId, uploaded_by: ProfileId) -> MaterialEvent {
        MaterialEvent::Uploaded(MaterialUploaded {
            material_id,
            course_id: CourseId::new(AggregateId::new()),
            module_id: ModuleId::new(),
            lesson_id: None,
            title: "Lecture slides".to_string(),
            description: "Week one slides.".to_string(),
            kind: LessonKind::Document,
            file_name: "slides.pdf".to_string(),
            uploaded_by,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn upload_then_remove_round_trip() {
        let projection = projection();
        let material_id = MaterialId::new(AggregateId::new());

        projection
            .apply_envelope(&envelope(&uploaded(material_id, ProfileId::new())))
            .unwrap();
        assert!(projection.get(&material_id).is_some());

        projection
            .apply_envelope(&envelope(&MaterialEvent::Removed(MaterialRemoved {
                material_id,
                occurred_at: Utc::now(),
            })))
            .unwrap();
        assert!(projection.get(&material_id).is_none());
    }

    #[test]
    fn uploader_filter() {
        let projection = projection();
        let instructor = ProfileId::new();

        projection
            .apply_envelope(&envelope(&uploaded(MaterialId::new(AggregateId::new()), instructor)))
            .unwrap();
        projection
            .apply_envelope(&envelope(&uploaded(
                MaterialId::new(AggregateId::new()),
                ProfileId::new(),
            )))
            .unwrap();

        assert_eq!(projection.list().len(), 2);
        assert_eq!(projection.list_for_uploader(instructor).len(), 1);
    }
}
