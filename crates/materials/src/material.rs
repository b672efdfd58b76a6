use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_catalog::{CourseId, LessonId, LessonKind, ModuleId};
use campus_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ProfileId};
use campus_events::Event;

/// Material identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub AggregateId);

impl MaterialId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: an uploaded course material.
///
/// A material targets a course and module, optionally a specific lesson, and
/// carries the same content type tag as lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    id: MaterialId,
    course_id: CourseId,
    module_id: ModuleId,
    lesson_id: Option<LessonId>,
    title: String,
    description: String,
    kind: LessonKind,
    file_name: String,
    uploaded_by: ProfileId,
    uploaded_at: Option<DateTime<Utc>>,
    removed: bool,
    version: u64,
    created: bool,
}

impl Material {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: MaterialId) -> Self {
        Self {
            id,
            course_id: CourseId::new(AggregateId::from_uuid(uuid::Uuid::nil())),
            module_id: ModuleId::from_uuid(uuid::Uuid::nil()),
            lesson_id: None,
            title: String::new(),
            description: String::new(),
            kind: LessonKind::Document,
            file_name: String::new(),
            uploaded_by: ProfileId::from_uuid(uuid::Uuid::nil()),
            uploaded_at: None,
            removed: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> MaterialId {
        self.id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn uploaded_by(&self) -> ProfileId {
        self.uploaded_by
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for Material {
    type Id = MaterialId;

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
pub struct UploadMaterial {
    pub material_id: MaterialId,
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub file_name: String,
    pub uploaded_by: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMaterial {
    pub material_id: MaterialId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialCommand {
    Upload(UploadMaterial),
    Remove(RemoveMaterial),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialUploaded {
    pub material_id: MaterialId,
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub file_name: String,
    pub uploaded_by: ProfileId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRemoved {
    pub material_id: MaterialId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialEvent {
    Uploaded(MaterialUploaded),
    Removed(MaterialRemoved),
}

impl Event for MaterialEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MaterialEvent::Uploaded(_) => "materials.material.uploaded",
            MaterialEvent::Removed(_) => "materials.material.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MaterialEvent::Uploaded(e) => e.occurred_at,
            MaterialEvent::Removed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Material {
    type Command = MaterialCommand;
    type Event = MaterialEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            MaterialEvent::Uploaded(e) => {
                self.id = e.material_id;
                self.course_id = e.course_id;
                self.module_id = e.module_id;
                self.lesson_id = e.lesson_id;
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.kind = e.kind;
                self.file_name = e.file_name.clone();
                self.uploaded_by = e.uploaded_by;
                self.uploaded_at = Some(e.occurred_at);
                self.removed = false;
                self.created = true;
            }
            MaterialEvent::Removed(_) => {
                self.removed = true;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            MaterialCommand::Upload(cmd) => {
                if self.created {
                    return Err(DomainError::invariant("material already exists"));
                }
                if cmd.title.trim().is_empty() {
                    return Err(DomainError::validation("title cannot be empty"));
                }
                if cmd.description.trim().is_empty() {
                    return Err(DomainError::validation("description cannot be empty"));
                }
                if cmd.file_name.trim().is_empty() {
                    return Err(DomainError::validation("a file must be selected"));
                }

                Ok(vec![MaterialEvent::Uploaded(MaterialUploaded {
                    material_id: cmd.material_id,
                    course_id: cmd.course_id,
                    module_id: cmd.module_id,
                    lesson_id: cmd.lesson_id,
                    title: cmd.title.trim().to_string(),
                    description: cmd.description.trim().to_string(),
                    kind: cmd.kind,
                    file_name: cmd.file_name.trim().to_string(),
                    uploaded_by: cmd.uploaded_by,
                    occurred_at: cmd.occurred_at,
                })])
            }
            MaterialCommand::Remove(cmd) => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                if self.removed {
                    return Err(DomainError::invariant("material already removed"));
                }

                Ok(vec![MaterialEvent::Removed(MaterialRemoved {
                    material_id: cmd.material_id,
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

    fn upload_cmd(material_id: MaterialId) -> UploadMaterial {
        UploadMaterial {
            material_id,
            course_id: CourseId::new(AggregateId::new()),
            module_id: ModuleId::new(),
            lesson_id: None,
            title: "Lecture slides".to_string(),
            description: "Week one slides.".to_string(),
            kind: LessonKind::Document,
            file_name: "slides-week-1.pdf".to_string(),
            uploaded_by: ProfileId::new(),
            occurred_at: now(),
        }
    }

    #[test]
    fn upload_and_remove_lifecycle() {
        let material_id = MaterialId::new(AggregateId::new());
        let mut material = Material::empty(material_id);

        let cmd = MaterialCommand::Upload(upload_cmd(material_id));
        for event in material.handle(&cmd).unwrap() {
            material.apply(&event);
        }
        assert!(!material.is_removed());

        let remove = MaterialCommand::Remove(RemoveMaterial {
            material_id,
            occurred_at: now(),
        });
        for event in material.handle(&remove).unwrap() {
            material.apply(&event);
        }
        assert!(material.is_removed());
        assert!(material.handle(&remove).is_err());
    }

    #[test]
    fn upload_requires_a_file() {
        let material_id = MaterialId::new(AggregateId::new());
        let material = Material::empty(material_id);
        let mut cmd = upload_cmd(material_id);
        cmd.file_name = "".to_string();
        assert!(material.handle(&MaterialCommand::Upload(cmd)).is_err());
    }

    #[test]
    fn remove_before_upload_is_not_found() {
        let material_id = MaterialId::new(AggregateId::new());
        let material = Material::empty(material_id);
        let remove = MaterialCommand::Remove(RemoveMaterial {
            material_id,
            occurred_at: now(),
        });
        assert_eq!(material.handle(&remove).unwrap_err(), DomainError::NotFound);
    }
}
