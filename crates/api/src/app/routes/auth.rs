use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

/// `POST /auth/login` (public).
///
/// A failed login surfaces a user-facing message and leaves the current
/// session untouched.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.sessions.login(&body.email, &body.password) {
        Ok(record) => {
            tracing::info!(email = %record.profile.email, "login");
            (StatusCode::OK, Json(dto::session_to_json(&record))).into_response()
        }
        Err(e) => {
            tracing::info!(email = %body.email, error = %e, "login rejected");
            errors::auth_error_to_response(e)
        }
    }
}

/// `POST /auth/logout`.
///
/// Clears in-memory and persisted session state unconditionally.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    match services.sessions.logout() {
        Ok(()) => {
            tracing::info!(email = %ctx.profile().email, "logout");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// `GET /auth/session` — the current session (whoami).
pub async fn session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_ctx): Extension<SessionContext>,
) -> axum::response::Response {
    match services.sessions.current() {
        Some(record) => (StatusCode::OK, Json(dto::session_to_json(&record))).into_response(),
        None => errors::unauthenticated_response(),
    }
}
