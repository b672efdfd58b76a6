//! Courses domain module (event-sourced).
//!
//! This crate contains business rules for the course catalog, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod course;

pub use course::{
    AddLesson, AddModule, Course, CourseCommand, CourseCreated, CourseDetailsUpdated, CourseEvent,
    CourseId, CourseLevel, CourseModule, CoursePublished, CourseUnpublished, CreateCourse, Lesson,
    LessonAdded, LessonId, LessonKind, ModuleAdded, ModuleId, PublishCourse, UnpublishCourse,
    UpdateCourseDetails,
};
