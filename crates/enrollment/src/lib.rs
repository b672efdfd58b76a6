//! Enrollment domain module (event-sourced).
//!
//! Links a student to a course and tracks completion progress.

pub mod enrollment;

pub use enrollment::{
    Enroll, Enrollment, EnrollmentCommand, EnrollmentEvent, EnrollmentId, ProgressRecorded,
    RecordProgress, StudentEnrolled,
};
