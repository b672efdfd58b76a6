use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use campus_auth::Role;
use campus_catalog::{LessonId, ModuleId};
use campus_core::AggregateId;
use campus_materials::{Material, MaterialCommand, MaterialId, UploadMaterial};

use crate::app::routes::courses::parse_course_id;
use crate::app::routes::staff_only;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    staff_only(Router::new().route("/", get(list_materials).post(upload_material)))
}

/// `GET /materials` — admins see everything, instructors their own uploads.
pub async fn list_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    let mut materials = match ctx.role() {
        Role::Admin => services.materials.list(),
        Role::Instructor => services.materials.list_for_uploader(ctx.profile_id()),
        Role::Student => return errors::forbidden_response(),
    };

    materials.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

    let items = materials.iter().map(dto::material_to_json).collect();
    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

/// `GET /my-materials` — materials visible to the session.
///
/// Students see materials of courses they are enrolled in.
pub async fn my_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    let mut materials = match ctx.role() {
        Role::Admin => services.materials.list(),
        Role::Instructor => services.materials.list_for_uploader(ctx.profile_id()),
        Role::Student => {
            let enrolled: HashSet<_> = services
                .enrollments
                .list_for_student(ctx.profile_id())
                .into_iter()
                .map(|e| e.course_id)
                .collect();
            services
                .materials
                .list()
                .into_iter()
                .filter(|m| enrolled.contains(&m.course_id))
                .collect()
        }
    };

    materials.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

    let items = materials.iter().map(dto::material_to_json).collect();
    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

/// `POST /materials`.
pub async fn upload_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::UploadMaterialRequest>,
) -> axum::response::Response {
    let course_id = match parse_course_id(&body.course_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(course) = services.courses.get(&course_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "course not found");
    };

    // Instructors may only upload into their own courses.
    let allowed = match ctx.role() {
        Role::Admin => true,
        Role::Instructor => course.instructor_id == ctx.profile_id(),
        Role::Student => false,
    };
    if !allowed {
        return errors::forbidden_response();
    }

    let Ok(module_uuid) = uuid::Uuid::parse_str(&body.module_id) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid module id");
    };
    let module_id = ModuleId::from_uuid(module_uuid);
    if !course.modules.iter().any(|m| m.id == module_id) {
        return errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_module",
            "the selected module does not belong to this course",
        );
    }

    let lesson_id = match body.lesson_id.as_deref() {
        None => None,
        Some(raw) => match uuid::Uuid::parse_str(raw) {
            Ok(uuid) => Some(LessonId::from_uuid(uuid)),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid lesson id");
            }
        },
    };

    let kind = match errors::parse_lesson_kind(&body.kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };

    let aggregate_id = AggregateId::new();
    let title = body.title.clone();

    let cmd = MaterialCommand::Upload(UploadMaterial {
        material_id: MaterialId::new(aggregate_id),
        course_id,
        module_id,
        lesson_id,
        title: body.title,
        description: body.description,
        kind,
        file_name: body.file_name,
        uploaded_by: ctx.profile_id(),
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Material>(aggregate_id, "materials.material", cmd, |id| {
        Material::empty(MaterialId::new(id))
    }) {
        Ok(_) => {
            services.notices.push_info(
                ctx.profile_id(),
                "Material uploaded",
                Some(format!("{} was uploaded to {}", title, course.title)),
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({"id": aggregate_id.to_string()})),
            )
                .into_response()
        }
        Err(e) => {
            services.notices.push_error(
                ctx.profile_id(),
                "Upload failed",
                Some("something went wrong while uploading the material".to_string()),
            );
            errors::dispatch_error_to_response(e)
        }
    }
}
