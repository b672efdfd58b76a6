use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};
use serde_json::json;

use campus_auth::Role;

use crate::app::services::AppServices;
use crate::context::SessionContext;

/// `GET /` — root resolution.
///
/// Admins land on the admin dashboard, everyone else on the user dashboard.
pub async fn root(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    let body = match ctx.role() {
        Role::Admin => {
            let courses = services.courses.list();
            json!({
                "dashboard": "admin",
                "stats": {
                    "users": services.accounts.list().len(),
                    "courses": courses.len(),
                    "published_courses": courses.iter().filter(|c| c.published).count(),
                    "enrollments": services.enrollments.list().len(),
                    "materials": services.materials.list().len(),
                },
            })
        }
        Role::Instructor => {
            let own_courses: Vec<_> = services
                .courses
                .list()
                .into_iter()
                .filter(|c| c.instructor_id == ctx.profile_id())
                .collect();
            json!({
                "dashboard": "instructor",
                "stats": {
                    "courses": own_courses.len(),
                    "students": own_courses.iter().map(|c| c.enrolled_count).sum::<u64>(),
                    "materials": services.materials.list_for_uploader(ctx.profile_id()).len(),
                },
            })
        }
        Role::Student => {
            let enrollments = services.enrollments.list_for_student(ctx.profile_id());
            let completed = enrollments.iter().filter(|e| e.completed).count();
            let average_progress = if enrollments.is_empty() {
                0
            } else {
                enrollments.iter().map(|e| e.progress as u32).sum::<u32>()
                    / enrollments.len() as u32
            };
            json!({
                "dashboard": "student",
                "stats": {
                    "enrollments": enrollments.len(),
                    "completed": completed,
                    "average_progress": average_progress,
                },
            })
        }
    };

    Json(body).into_response()
}

/// `GET /menu` — the menu set for the session's role, and no other's.
pub async fn menu(Extension(ctx): Extension<SessionContext>) -> axum::response::Response {
    let items: Vec<(&str, &str)> = match ctx.role() {
        Role::Admin => vec![
            ("Courses", "/courses"),
            ("Users", "/users"),
            ("Materials", "/materials"),
            ("Calendar", "/calendar"),
            ("Settings", "/settings"),
        ],
        Role::Instructor => vec![
            ("Dashboard", "/"),
            ("Courses", "/courses"),
            ("Materials", "/materials"),
            ("Calendar", "/calendar"),
            ("Settings", "/settings"),
        ],
        Role::Student => vec![
            ("My Courses", "/my-courses"),
            ("Materials", "/my-materials"),
            ("Calendar", "/my-calendar"),
            ("Settings", "/settings"),
        ],
    };

    let items: Vec<_> = items
        .into_iter()
        .map(|(label, path)| json!({"label": label, "path": path}))
        .collect();

    Json(json!({
        "role": ctx.role(),
        "items": items,
    }))
    .into_response()
}
