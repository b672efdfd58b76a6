use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ProfileId};
use campus_events::Event;

/// Course identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub AggregateId);

impl CourseId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CourseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a module within a course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(Uuid);

impl ModuleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a lesson within a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(Uuid);

impl LessonId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LessonId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for LessonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Difficulty level of a course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub const ALL: [CourseLevel; 3] = [
        CourseLevel::Beginner,
        CourseLevel::Intermediate,
        CourseLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl core::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            other => Err(DomainError::validation(format!("unknown level: {other}"))),
        }
    }
}

/// Content type tag of a lesson (and of uploaded materials).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Document,
    Quiz,
}

impl LessonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Document => "document",
            LessonKind::Quiz => "quiz",
        }
    }
}

impl core::fmt::Display for LessonKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(LessonKind::Video),
            "document" => Ok(LessonKind::Document),
            "quiz" => Ok(LessonKind::Quiz),
            other => Err(DomainError::validation(format!("unknown lesson type: {other}"))),
        }
    }
}

/// A lesson inside a module (ordered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub kind: LessonKind,
    pub duration_minutes: Option<u32>,
    /// Content reference: a URL for videos, inline text for documents/quizzes.
    pub content: String,
}

/// A module inside a course (ordered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: ModuleId,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Course Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate root: Course.
///
/// # Invariants
/// - Modules and lessons keep insertion order.
/// - Module ids are unique within a course.
/// - A course cannot be published without at least one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    instructor_id: ProfileId,
    instructor_name: String,
    level: CourseLevel,
    duration_weeks: u32,
    published: bool,
    modules: Vec<CourseModule>,
    version: u64,
    created: bool,
}

impl Course {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CourseId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            instructor_id: ProfileId::from_uuid(Uuid::nil()),
            instructor_name: String::new(),
            level: CourseLevel::Beginner,
            duration_weeks: 0,
            published: false,
            modules: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CourseId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instructor_id(&self) -> ProfileId {
        self.instructor_id
    }

    pub fn level(&self) -> CourseLevel {
        self.level
    }

    pub fn is_published(&self) -> bool {
        self.published
    }

    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    fn module(&self, module_id: ModuleId) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }
}

impl AggregateRoot for Course {
    type Id = CourseId;

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
pub struct CreateCourse {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor_id: ProfileId,
    pub instructor_name: String,
    pub level: CourseLevel,
    pub duration_weeks: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Update basic details. `Some` fields are applied; `None` left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCourseDetails {
    pub course_id: CourseId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<CourseLevel>,
    pub duration_weeks: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddModule {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLesson {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: LessonId,
    pub title: String,
    pub kind: LessonKind,
    pub duration_minutes: Option<u32>,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishCourse {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpublishCourse {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseCommand {
    Create(CreateCourse),
    UpdateDetails(UpdateCourseDetails),
    AddModule(AddModule),
    AddLesson(AddLesson),
    Publish(PublishCourse),
    Unpublish(UnpublishCourse),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCreated {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor_id: ProfileId,
    pub instructor_name: String,
    pub level: CourseLevel,
    pub duration_weeks: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetailsUpdated {
    pub course_id: CourseId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<CourseLevel>,
    pub duration_weeks: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAdded {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonAdded {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub lesson_id: LessonId,
    pub title: String,
    pub kind: LessonKind,
    pub duration_minutes: Option<u32>,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePublished {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUnpublished {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseEvent {
    Created(CourseCreated),
    DetailsUpdated(CourseDetailsUpdated),
    ModuleAdded(ModuleAdded),
    LessonAdded(LessonAdded),
    Published(CoursePublished),
    Unpublished(CourseUnpublished),
}

impl Event for CourseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CourseEvent::Created(_) => "catalog.course.created",
            CourseEvent::DetailsUpdated(_) => "catalog.course.details_updated",
            CourseEvent::ModuleAdded(_) => "catalog.course.module_added",
            CourseEvent::LessonAdded(_) => "catalog.course.lesson_added",
            CourseEvent::Published(_) => "catalog.course.published",
            CourseEvent::Unpublished(_) => "catalog.course.unpublished",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CourseEvent::Created(e) => e.occurred_at,
            CourseEvent::DetailsUpdated(e) => e.occurred_at,
            CourseEvent::ModuleAdded(e) => e.occurred_at,
            CourseEvent::LessonAdded(e) => e.occurred_at,
            CourseEvent::Published(e) => e.occurred_at,
            CourseEvent::Unpublished(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Course {
    type Command = CourseCommand;
    type Event = CourseEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CourseEvent::Created(e) => self.apply_created(e),
            CourseEvent::DetailsUpdated(e) => self.apply_details_updated(e),
            CourseEvent::ModuleAdded(e) => self.apply_module_added(e),
            CourseEvent::LessonAdded(e) => self.apply_lesson_added(e),
            CourseEvent::Published(_) => self.published = true,
            CourseEvent::Unpublished(_) => self.published = false,
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CourseCommand::Create(cmd) => self.handle_create(cmd),
            CourseCommand::UpdateDetails(cmd) => self.handle_update_details(cmd),
            CourseCommand::AddModule(cmd) => self.handle_add_module(cmd),
            CourseCommand::AddLesson(cmd) => self.handle_add_lesson(cmd),
            CourseCommand::Publish(cmd) => self.handle_publish(cmd),
            CourseCommand::Unpublish(cmd) => self.handle_unpublish(cmd),
        }
    }
}

impl Course {
    fn handle_create(&self, cmd: &CreateCourse) -> Result<Vec<CourseEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("course already exists"));
        }
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if cmd.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if cmd.instructor_name.trim().is_empty() {
            return Err(DomainError::validation("instructor name cannot be empty"));
        }

        Ok(vec![CourseEvent::Created(CourseCreated {
            course_id: cmd.course_id,
            title: cmd.title.trim().to_string(),
            description: cmd.description.trim().to_string(),
            instructor_id: cmd.instructor_id,
            instructor_name: cmd.instructor_name.trim().to_string(),
            level: cmd.level,
            duration_weeks: cmd.duration_weeks,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_details(
        &self,
        cmd: &UpdateCourseDetails,
    ) -> Result<Vec<CourseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if let Some(title) = &cmd.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title cannot be empty"));
            }
        }
        if cmd.title.is_none()
            && cmd.description.is_none()
            && cmd.level.is_none()
            && cmd.duration_weeks.is_none()
        {
            return Ok(vec![]);
        }

        Ok(vec![CourseEvent::DetailsUpdated(CourseDetailsUpdated {
            course_id: cmd.course_id,
            title: cmd.title.as_deref().map(|s| s.trim().to_string()),
            description: cmd.description.clone(),
            level: cmd.level,
            duration_weeks: cmd.duration_weeks,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_module(&self, cmd: &AddModule) -> Result<Vec<CourseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("module title cannot be empty"));
        }
        if self.module(cmd.module_id).is_some() {
            return Err(DomainError::invariant("module already exists"));
        }

        Ok(vec![CourseEvent::ModuleAdded(ModuleAdded {
            course_id: cmd.course_id,
            module_id: cmd.module_id,
            title: cmd.title.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_lesson(&self, cmd: &AddLesson) -> Result<Vec<CourseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("lesson title cannot be empty"));
        }
        let module = self
            .module(cmd.module_id)
            .ok_or_else(|| DomainError::invariant("unknown module"))?;
        if module.lessons.iter().any(|l| l.id == cmd.lesson_id) {
            return Err(DomainError::invariant("lesson already exists"));
        }

        Ok(vec![CourseEvent::LessonAdded(LessonAdded {
            course_id: cmd.course_id,
            module_id: cmd.module_id,
            lesson_id: cmd.lesson_id,
            title: cmd.title.trim().to_string(),
            kind: cmd.kind,
            duration_minutes: cmd.duration_minutes,
            content: cmd.content.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_publish(&self, cmd: &PublishCourse) -> Result<Vec<CourseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if self.published {
            return Err(DomainError::invariant("course already published"));
        }
        if self.lesson_count() == 0 {
            return Err(DomainError::invariant(
                "course needs at least one lesson before publishing",
            ));
        }

        Ok(vec![CourseEvent::Published(CoursePublished {
            course_id: cmd.course_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_unpublish(&self, cmd: &UnpublishCourse) -> Result<Vec<CourseEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if !self.published {
            return Err(DomainError::invariant("course is not published"));
        }

        Ok(vec![CourseEvent::Unpublished(CourseUnpublished {
            course_id: cmd.course_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn apply_created(&mut self, e: &CourseCreated) {
        self.id = e.course_id;
        self.title = e.title.clone();
        self.description = e.description.clone();
        self.instructor_id = e.instructor_id;
        self.instructor_name = e.instructor_name.clone();
        self.level = e.level;
        self.duration_weeks = e.duration_weeks;
        self.published = false;
        self.modules = Vec::new();
        self.created = true;
    }

    fn apply_details_updated(&mut self, e: &CourseDetailsUpdated) {
        if let Some(title) = &e.title {
            self.title = title.clone();
        }
        if let Some(description) = &e.description {
            self.description = description.clone();
        }
        if let Some(level) = e.level {
            self.level = level;
        }
        if let Some(weeks) = e.duration_weeks {
            self.duration_weeks = weeks;
        }
    }

    fn apply_module_added(&mut self, e: &ModuleAdded) {
        self.modules.push(CourseModule {
            id: e.module_id,
            title: e.title.clone(),
            lessons: Vec::new(),
        });
    }

    fn apply_lesson_added(&mut self, e: &LessonAdded) {
        if let Some(module) = self.modules.iter_mut().find(|m| m.id == e.module_id) {
            module.lessons.push(Lesson {
                id: e.lesson_id,
                title: e.title.clone(),
                kind: e.kind,
                duration_minutes: e.duration_minutes,
                content: e.content.clone(),
            });
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

    fn created_course() -> Course {
        let course_id = CourseId::new(AggregateId::new());
        let mut course = Course::empty(course_id);
        let cmd = CourseCommand::Create(CreateCourse {
            course_id,
            title: "Introduction to Web Programming".to_string(),
            description: "HTML, CSS and JavaScript fundamentals.".to_string(),
            instructor_id: ProfileId::new(),
            instructor_name: "Maria Gonzalez".to_string(),
            level: CourseLevel::Beginner,
            duration_weeks: 6,
            occurred_at: now(),
        });
        for event in course.handle(&cmd).unwrap() {
            course.apply(&event);
        }
        course
    }

    fn add_module(course: &mut Course, title: &str) -> ModuleId {
        let module_id = ModuleId::new();
        let cmd = CourseCommand::AddModule(AddModule {
            course_id: course.id_typed(),
            module_id,
            title: title.to_string(),
            occurred_at: now(),
        });
        for event in course.handle(&cmd).unwrap() {
            course.apply(&event);
        }
        module_id
    }

    fn add_lesson(course: &mut Course, module_id: ModuleId, title: &str, kind: LessonKind) {
        let cmd = CourseCommand::AddLesson(AddLesson {
            course_id: course.id_typed(),
            module_id,
            lesson_id: LessonId::new(),
            title: title.to_string(),
            kind,
            duration_minutes: Some(10),
            content: "https://example.com/video.mp4".to_string(),
            occurred_at: now(),
        });
        for event in course.handle(&cmd).unwrap() {
            course.apply(&event);
        }
    }

    #[test]
    fn create_course_success() {
        let course = created_course();
        assert!(course.title() == "Introduction to Web Programming");
        assert_eq!(course.level(), CourseLevel::Beginner);
        assert!(!course.is_published());
    }

    #[test]
    fn create_requires_title() {
        let course_id = CourseId::new(AggregateId::new());
        let course = Course::empty(course_id);
        let cmd = CourseCommand::Create(CreateCourse {
            course_id,
            title: "  ".to_string(),
            description: "desc".to_string(),
            instructor_id: ProfileId::new(),
            instructor_name: "X".to_string(),
            level: CourseLevel::Advanced,
            duration_weeks: 4,
            occurred_at: now(),
        });
        assert!(course.handle(&cmd).is_err());
    }

    #[test]
    fn modules_and_lessons_keep_insertion_order() {
        let mut course = created_course();
        let m1 = add_module(&mut course, "HTML Fundamentals");
        let m2 = add_module(&mut course, "Basic CSS");
        add_lesson(&mut course, m1, "Basic HTML structure", LessonKind::Video);
        add_lesson(&mut course, m1, "Semantic tags", LessonKind::Document);
        add_lesson(&mut course, m2, "Selectors and properties", LessonKind::Video);

        let modules = course.modules();
        assert_eq!(modules[0].title, "HTML Fundamentals");
        assert_eq!(modules[1].title, "Basic CSS");
        assert_eq!(modules[0].lessons.len(), 2);
        assert_eq!(modules[0].lessons[0].title, "Basic HTML structure");
        assert_eq!(modules[0].lessons[1].title, "Semantic tags");
        assert_eq!(course.lesson_count(), 3);
        assert_eq!(modules[1].lessons.len(), 1);
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let mut course = created_course();
        let module_id = add_module(&mut course, "HTML Fundamentals");

        let cmd = CourseCommand::AddModule(AddModule {
            course_id: course.id_typed(),
            module_id,
            title: "Duplicate".to_string(),
            occurred_at: now(),
        });
        assert!(course.handle(&cmd).is_err());
    }

    #[test]
    fn lesson_requires_known_module() {
        let course = created_course();
        let cmd = CourseCommand::AddLesson(AddLesson {
            course_id: course.id_typed(),
            module_id: ModuleId::new(),
            lesson_id: LessonId::new(),
            title: "Orphan".to_string(),
            kind: LessonKind::Quiz,
            duration_minutes: None,
            content: "quiz body".to_string(),
            occurred_at: now(),
        });
        assert!(course.handle(&cmd).is_err());
    }

    #[test]
    fn publish_requires_a_lesson() {
        let mut course = created_course();
        let publish = CourseCommand::Publish(PublishCourse {
            course_id: course.id_typed(),
            occurred_at: now(),
        });
        assert!(course.handle(&publish).is_err());

        let module_id = add_module(&mut course, "HTML Fundamentals");
        add_lesson(&mut course, module_id, "Basic HTML structure", LessonKind::Video);

        for event in course.handle(&publish).unwrap() {
            course.apply(&event);
        }
        assert!(course.is_published());

        // Publishing twice violates the lifecycle.
        assert!(course.handle(&publish).is_err());
    }

    #[test]
    fn unpublish_round_trip() {
        let mut course = created_course();
        let module_id = add_module(&mut course, "Module");
        add_lesson(&mut course, module_id, "Lesson", LessonKind::Document);

        let publish = CourseCommand::Publish(PublishCourse {
            course_id: course.id_typed(),
            occurred_at: now(),
        });
        for event in course.handle(&publish).unwrap() {
            course.apply(&event);
        }

        let unpublish = CourseCommand::Unpublish(UnpublishCourse {
            course_id: course.id_typed(),
            occurred_at: now(),
        });
        for event in course.handle(&unpublish).unwrap() {
            course.apply(&event);
        }
        assert!(!course.is_published());
        assert!(course.handle(&unpublish).is_err());
    }

    #[test]
    fn update_details_applies_selected_fields() {
        let mut course = created_course();
        let cmd = CourseCommand::UpdateDetails(UpdateCourseDetails {
            course_id: course.id_typed(),
            title: None,
            description: None,
            level: Some(CourseLevel::Intermediate),
            duration_weeks: Some(8),
            occurred_at: now(),
        });
        for event in course.handle(&cmd).unwrap() {
            course.apply(&event);
        }
        assert_eq!(course.level(), CourseLevel::Intermediate);
        assert_eq!(course.title(), "Introduction to Web Programming");
    }

    proptest! {
        #[test]
        fn lessons_preserve_arbitrary_insertion_order(titles in proptest::collection::vec("[a-z]{1,12}", 1..8)) {
            let mut course = created_course();
            let module_id = add_module(&mut course, "Module");
            for title in &titles {
                add_lesson(&mut course, module_id, title, LessonKind::Document);
            }
            let stored: Vec<_> = course.modules()[0]
                .lessons
                .iter()
                .map(|l| l.title.clone())
                .collect();
            prop_assert_eq!(stored, titles);
        }
    }
}
