use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// `GET /notifications` — currently visible notices (at most one).
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    let notices = services.notices.visible(ctx.profile_id());

    let items = notices
        .iter()
        .map(|n| serde_json::to_value(n).unwrap_or_default())
        .collect();

    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

/// `POST /notifications/dismiss` — one notice by id, or all open notices.
pub async fn dismiss(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::DismissNoticeRequest>,
) -> axum::response::Response {
    services.notices.dismiss(ctx.profile_id(), body.id);

    StatusCode::NO_CONTENT.into_response()
}
