use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use campus_auth::AuthError;
use campus_catalog::{CourseLevel, LessonKind};
use campus_infra::command_dispatcher::DispatchError;
use campus_scheduling::ScheduleEventKind;

use crate::guard::{LOGIN_PATH, ROOT_PATH};

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DispatchError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DispatchError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DispatchError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
        DispatchError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DispatchError::Deserialize(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "deserialize_error", msg)
        }
        DispatchError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            format!("{e:?}"),
        ),
        DispatchError::Publish(msg) => json_error(StatusCode::BAD_GATEWAY, "publish_error", msg),
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "incorrect email or password",
        ),
        AuthError::AccountInactive => json_error(
            StatusCode::FORBIDDEN,
            "account_inactive",
            "this account has been deactivated",
        ),
        AuthError::AttemptInFlight => json_error(
            StatusCode::CONFLICT,
            "attempt_in_flight",
            "a login attempt is already in progress",
        ),
        AuthError::NotReady => session_loading_response(),
        AuthError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_store_error", e.to_string())
        }
    }
}

/// Placeholder rendered while session state is still loading.
pub fn session_loading_response() -> axum::response::Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(axum::http::header::RETRY_AFTER, "1")],
        axum::Json(json!({
            "error": "session_loading",
            "message": "session state is still loading",
        })),
    )
        .into_response()
}

/// Unauthenticated sessions are redirected to the login path.
pub fn unauthenticated_response() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({
            "error": "unauthenticated",
            "location": LOGIN_PATH,
        })),
    )
        .into_response()
}

/// Authenticated but under-privileged sessions are redirected to the root.
pub fn forbidden_response() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "forbidden",
            "location": ROOT_PATH,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_course_level(s: &str) -> Result<CourseLevel, axum::response::Response> {
    s.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_level",
            "level must be one of: beginner, intermediate, advanced",
        )
    })
}

pub fn parse_lesson_kind(s: &str) -> Result<LessonKind, axum::response::Response> {
    s.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_kind",
            "type must be one of: video, document, quiz",
        )
    })
}

pub fn parse_event_kind(s: &str) -> Result<ScheduleEventKind, axum::response::Response> {
    s.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_kind",
            "kind must be one of: deadline, live-class, webinar, quiz",
        )
    })
}
