use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod calendar;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod materials;
pub mod notifications;
pub mod settings;
pub mod system;
pub mod users;

use crate::middleware;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(dashboard::root))
        .route("/menu", get(dashboard::menu))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .nest("/courses", courses::router())
        .route("/my-courses", get(enrollments::my_courses))
        .route("/enrollments/:id/progress", post(enrollments::record_progress))
        .nest("/users", users::router())
        .nest("/materials", materials::router())
        .route("/my-materials", get(materials::my_materials))
        .nest("/calendar", calendar::router())
        .route("/my-calendar", get(calendar::my_calendar))
        .route(
            "/settings/profile",
            get(settings::get_profile).put(settings::update_profile),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/dismiss", post(notifications::dismiss))
        .route("/stream", get(system::stream))
}

fn admin_only(router: Router) -> Router {
    router.route_layer(axum::middleware::from_fn(middleware::require_admin))
}

fn staff_only(router: Router) -> Router {
    router.route_layer(axum::middleware::from_fn(middleware::require_staff))
}
