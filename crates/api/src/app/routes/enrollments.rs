use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use campus_core::AggregateId;
use campus_enrollment::{Enroll, Enrollment, EnrollmentCommand, EnrollmentId, RecordProgress};

use crate::app::routes::courses::parse_course_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;
use crate::guard::{self, RoleGate};

/// `GET /my-courses` — the session's enrollments joined with their courses.
pub async fn my_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    let mut enrollments = services.enrollments.list_for_student(ctx.profile_id());
    enrollments.sort_by_key(|e| e.enrolled_at);

    let courses: HashMap<_, _> = services
        .courses
        .list()
        .into_iter()
        .map(|c| (c.course_id, c))
        .collect();

    let items = enrollments
        .iter()
        .map(|e| dto::enrollment_to_json(e, courses.get(&e.course_id)))
        .collect();

    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

/// `POST /courses/:id/enroll`.
pub async fn enroll(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let RoleGate::RedirectToRoot = guard::student_gate(ctx.role()) {
        return errors::forbidden_response();
    }

    let course_id = match parse_course_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(course) = services.courses.get(&course_id).filter(|c| c.published) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "course not found");
    };

    // One enrollment per (student, course).
    if services.enrollments.find(ctx.profile_id(), course_id).is_some() {
        return errors::json_error(
            StatusCode::CONFLICT,
            "already_enrolled",
            "you are already enrolled in this course",
        );
    }

    let aggregate_id = AggregateId::new();
    let enrollment_id = EnrollmentId::new(aggregate_id);

    let cmd = EnrollmentCommand::Enroll(Enroll {
        enrollment_id,
        student_id: ctx.profile_id(),
        course_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Enrollment>(aggregate_id, "enrollment.enrollment", cmd, |id| {
        Enrollment::empty(EnrollmentId::new(id))
    }) {
        Ok(_) => {
            services.notices.push_info(
                ctx.profile_id(),
                "Enrolled",
                Some(format!("You are now enrolled in {}", course.title)),
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({"id": aggregate_id.to_string()})),
            )
                .into_response()
        }
        Err(e) => {
            services
                .notices
                .push_error(ctx.profile_id(), "Enrollment failed", None);
            errors::dispatch_error_to_response(e)
        }
    }
}

/// `POST /enrollments/:id/progress`.
pub async fn record_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordProgressRequest>,
) -> axum::response::Response {
    if let RoleGate::RedirectToRoot = guard::student_gate(ctx.role()) {
        return errors::forbidden_response();
    }

    let Ok(aggregate_id) = id.parse::<AggregateId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid enrollment id");
    };
    let enrollment_id = EnrollmentId::new(aggregate_id);

    let Some(enrollment) = services.enrollments.get(&enrollment_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "enrollment not found");
    };
    if enrollment.student_id != ctx.profile_id() {
        return errors::forbidden_response();
    }

    let cmd = EnrollmentCommand::RecordProgress(RecordProgress {
        enrollment_id,
        progress: body.progress,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Enrollment>(aggregate_id, "enrollment.enrollment", cmd, |id| {
        Enrollment::empty(EnrollmentId::new(id))
    }) {
        Ok(_) => {
            if body.progress == 100 {
                services
                    .notices
                    .push_info(ctx.profile_id(), "Course completed", None);
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "id": id,
                    "progress": body.progress,
                    "completed": body.progress == 100,
                })),
            )
                .into_response()
        }
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
