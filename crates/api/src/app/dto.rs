use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use campus_auth::SessionRecord;
use campus_infra::projections::{
    AccountReadModel, CourseReadModel, EnrollmentReadModel, MaterialReadModel,
    ScheduleEventReadModel,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub level: String,
    pub duration_weeks: u32,
    /// Admins may create a course on behalf of an instructor; instructors
    /// always author their own.
    pub instructor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddModuleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLessonRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration_minutes: Option<u32>,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordProgressRequest {
    pub progress: u8,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// Accepted but not stored; credentials are not verified in this
    /// deployment.
    pub password: Option<String>,
    pub role: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadMaterialRequest {
    pub title: String,
    pub description: String,
    pub course_id: String,
    pub module_id: String,
    pub lesson_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleEventRequest {
    pub course_id: String,
    pub title: String,
    pub kind: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DismissNoticeRequest {
    /// Dismiss one notice, or all open notices when absent.
    pub id: Option<campus_notify::NoticeId>,
}

#[derive(Debug, Deserialize)]
pub struct CourseListQuery {
    /// Case-insensitive search over title/description/instructor.
    pub q: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn session_to_json(record: &SessionRecord) -> JsonValue {
    json!({
        "token": record.token,
        "logged_in_at": record.logged_in_at,
        "profile": profile_json(record),
    })
}

fn profile_json(record: &SessionRecord) -> JsonValue {
    json!({
        "id": record.profile.id,
        "display_name": record.profile.display_name,
        "email": record.profile.email,
        "role": record.profile.role,
        "avatar_url": record.profile.avatar_url,
        "bio": record.profile.bio,
    })
}

pub fn account_to_json(account: &AccountReadModel) -> JsonValue {
    json!({
        "id": account.profile_id,
        "display_name": account.display_name,
        "email": account.email,
        "role": account.role,
        "status": account.status,
        "avatar_url": account.avatar_url,
        "bio": account.bio,
        "created_at": account.created_at,
        "updated_at": account.updated_at,
    })
}

pub fn course_to_json(course: &CourseReadModel) -> JsonValue {
    json!({
        "id": course.course_id,
        "title": course.title,
        "description": course.description,
        "instructor": {
            "id": course.instructor_id,
            "name": course.instructor_name,
        },
        "level": course.level,
        "duration_weeks": course.duration_weeks,
        "published": course.published,
        "enrolled_count": course.enrolled_count,
        "lesson_count": course.lesson_count(),
        "modules": course.modules,
        "created_at": course.created_at,
    })
}

pub fn enrollment_to_json(
    enrollment: &EnrollmentReadModel,
    course: Option<&CourseReadModel>,
) -> JsonValue {
    json!({
        "id": enrollment.enrollment_id,
        "course_id": enrollment.course_id,
        "progress": enrollment.progress,
        "completed": enrollment.completed,
        "enrolled_at": enrollment.enrolled_at,
        "last_accessed_at": enrollment.last_accessed_at,
        "course": course.map(course_to_json),
    })
}

pub fn material_to_json(material: &MaterialReadModel) -> JsonValue {
    json!({
        "id": material.material_id,
        "course_id": material.course_id,
        "module_id": material.module_id,
        "lesson_id": material.lesson_id,
        "title": material.title,
        "description": material.description,
        "type": material.kind,
        "file_name": material.file_name,
        "uploaded_by": material.uploaded_by,
        "uploaded_at": material.uploaded_at,
    })
}

pub fn schedule_event_to_json(event: &ScheduleEventReadModel) -> JsonValue {
    json!({
        "id": event.event_id,
        "course_id": event.course_id,
        "title": event.title,
        "kind": event.kind,
        "starts_at": event.starts_at,
        "duration_minutes": event.duration_minutes,
    })
}

/// Collection envelope: an explicit total makes the empty "no results" state
/// distinguishable from a missing collection.
pub fn collection(items: Vec<JsonValue>) -> JsonValue {
    json!({
        "total": items.len(),
        "items": items,
    })
}
