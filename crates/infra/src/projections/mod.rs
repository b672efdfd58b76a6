//! Projections: bus consumers maintaining query-side read models.
//!
//! Projections are idempotent under event replay; the event store remains
//! the source of truth and any read model can be rebuilt from it.

pub mod accounts;
pub mod courses;
pub mod enrollments;
pub mod materials;
pub mod schedule;

pub use accounts::{AccountReadModel, AccountsProjection};
pub use courses::{CourseReadModel, CoursesProjection};
pub use enrollments::{EnrollmentReadModel, EnrollmentsProjection};
pub use materials::{MaterialReadModel, MaterialsProjection};
pub use schedule::{ScheduleEventReadModel, ScheduleProjection};
