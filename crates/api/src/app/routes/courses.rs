use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use campus_auth::Role;
use campus_catalog::{
    AddLesson, AddModule, Course, CourseCommand, CourseId, CreateCourse, LessonId, ModuleId,
    PublishCourse, UnpublishCourse,
};
use campus_core::{AggregateId, ProfileId};
use campus_infra::projections::CourseReadModel;

use crate::app::routes::enrollments;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;
use crate::guard::{self, RoleGate};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:id", get(get_course))
        .route("/:id/publish", post(publish_course))
        .route("/:id/unpublish", post(unpublish_course))
        .route("/:id/modules", post(add_module))
        .route("/:id/modules/:module_id/lessons", post(add_lesson))
        .route("/:id/enroll", post(enrollments::enroll))
}

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<dto::CourseListQuery>,
) -> axum::response::Response {
    let level = match query.level.as_deref().map(errors::parse_course_level).transpose() {
        Ok(level) => level,
        Err(resp) => return resp,
    };

    // Students browse the published catalog only.
    let mut courses = match ctx.role() {
        Role::Admin | Role::Instructor => services.courses.list(),
        Role::Student => services.courses.list_published(),
    };

    if let Some(level) = level {
        courses.retain(|c| c.level == level);
    }

    if let Some(text) = query.q.as_deref() {
        let needle = text.trim().to_lowercase();
        if !needle.is_empty() {
            courses.retain(|c| {
                c.title.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.instructor_name.to_lowercase().contains(&needle)
            });
        }
    }

    courses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.title.cmp(&b.title)));

    let items = courses.iter().map(dto::course_to_json).collect();
    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let course_id = match parse_course_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let visible = services.courses.get(&course_id).filter(|c| match ctx.role() {
        Role::Admin | Role::Instructor => true,
        Role::Student => c.published,
    });

    match visible {
        Some(course) => (StatusCode::OK, Json(dto::course_to_json(&course))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "course not found"),
    }
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::CreateCourseRequest>,
) -> axum::response::Response {
    if let RoleGate::RedirectToRoot = guard::staff_gate(ctx.role()) {
        return errors::forbidden_response();
    }

    let level = match errors::parse_course_level(&body.level) {
        Ok(level) => level,
        Err(resp) => return resp,
    };

    // Instructors author their own courses; admins create on behalf of one.
    let (instructor_id, instructor_name) = match ctx.role() {
        Role::Instructor => (ctx.profile_id(), ctx.profile().display_name.clone()),
        Role::Admin => {
            let Some(raw) = body.instructor_id.as_deref() else {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "missing_instructor",
                    "instructor_id is required",
                );
            };
            let Ok(profile_id) = raw.parse::<ProfileId>() else {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid instructor id",
                );
            };
            let Some(account) = services.accounts.get(&profile_id) else {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "instructor not found",
                );
            };
            if account.role != Role::Instructor {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "not_an_instructor",
                    "the referenced account is not an instructor",
                );
            }
            (account.profile_id, account.display_name)
        }
        Role::Student => return errors::forbidden_response(),
    };

    let aggregate_id = AggregateId::new();
    let course_id = CourseId::new(aggregate_id);

    let cmd = CourseCommand::Create(CreateCourse {
        course_id,
        title: body.title,
        description: body.description,
        instructor_id,
        instructor_name,
        level,
        duration_weeks: body.duration_weeks,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Course>(
        aggregate_id,
        "catalog.course",
        cmd,
        |id| Course::empty(CourseId::new(id)),
    ) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    services
        .notices
        .push_info(ctx.profile_id(), "Course created", None);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": aggregate_id.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

pub async fn publish_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (aggregate_id, course_id) = match authored_course(&services, &ctx, &id) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let cmd = CourseCommand::Publish(PublishCourse {
        course_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Course>(aggregate_id, "catalog.course", cmd, |id| {
        Course::empty(CourseId::new(id))
    }) {
        Ok(_) => {
            services
                .notices
                .push_info(ctx.profile_id(), "Course published", None);
            (StatusCode::OK, Json(serde_json::json!({"id": id}))).into_response()
        }
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn unpublish_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (aggregate_id, course_id) = match authored_course(&services, &ctx, &id) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let cmd = CourseCommand::Unpublish(UnpublishCourse {
        course_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Course>(aggregate_id, "catalog.course", cmd, |id| {
        Course::empty(CourseId::new(id))
    }) {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"id": id}))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn add_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddModuleRequest>,
) -> axum::response::Response {
    let (aggregate_id, course_id) = match authored_course(&services, &ctx, &id) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let module_id = ModuleId::new();
    let cmd = CourseCommand::AddModule(AddModule {
        course_id,
        module_id,
        title: body.title,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Course>(aggregate_id, "catalog.course", cmd, |id| {
        Course::empty(CourseId::new(id))
    }) {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": module_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn add_lesson(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path((id, module_id)): Path<(String, String)>,
    Json(body): Json<dto::AddLessonRequest>,
) -> axum::response::Response {
    let (aggregate_id, course_id) = match authored_course(&services, &ctx, &id) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    let Ok(module_uuid) = uuid::Uuid::parse_str(&module_id) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid module id");
    };

    let kind = match errors::parse_lesson_kind(&body.kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };

    let lesson_id = LessonId::new();
    let cmd = CourseCommand::AddLesson(AddLesson {
        course_id,
        module_id: ModuleId::from_uuid(module_uuid),
        lesson_id,
        title: body.title,
        kind,
        duration_minutes: body.duration_minutes,
        content: body.content,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Course>(aggregate_id, "catalog.course", cmd, |id| {
        Course::empty(CourseId::new(id))
    }) {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": lesson_id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub fn parse_course_id(raw: &str) -> Result<CourseId, axum::response::Response> {
    raw.parse::<AggregateId>()
        .map(CourseId::new)
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid course id"))
}

/// Resolve a mutable course for the session: staff only, and instructors may
/// only touch their own courses.
fn authored_course(
    services: &AppServices,
    ctx: &SessionContext,
    raw_id: &str,
) -> Result<(AggregateId, CourseId), axum::response::Response> {
    if let RoleGate::RedirectToRoot = guard::staff_gate(ctx.role()) {
        return Err(errors::forbidden_response());
    }

    let course_id = parse_course_id(raw_id)?;

    let Some(course) = services.courses.get(&course_id) else {
        return Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "course not found",
        ));
    };

    if !may_edit(ctx, &course) {
        return Err(errors::forbidden_response());
    }

    Ok((course_id.0, course_id))
}

fn may_edit(ctx: &SessionContext, course: &CourseReadModel) -> bool {
    match ctx.role() {
        Role::Admin => true,
        Role::Instructor => course.instructor_id == ctx.profile_id(),
        Role::Student => false,
    }
}
