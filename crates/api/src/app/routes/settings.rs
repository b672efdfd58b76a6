use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use campus_auth::{Account, AccountCommand, UpdateProfile};
use campus_core::{AggregateId, ProfileId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

/// `GET /settings/profile`.
pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    match services.accounts.get(&ctx.profile_id()) {
        Some(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "profile not found"),
    }
}

/// `PUT /settings/profile`.
///
/// Applies the change through the account aggregate, then refreshes the
/// profile embedded in the active session so the persisted record stays
/// current.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    let profile_id = ctx.profile_id();

    let cmd = AccountCommand::UpdateProfile(UpdateProfile {
        profile_id,
        display_name: body.display_name.clone(),
        avatar_url: body.avatar_url.clone(),
        bio: body.bio.clone(),
        occurred_at: Utc::now(),
    });

    if let Err(e) = services.dispatch::<Account>(
        AggregateId::from(profile_id),
        "auth.account",
        cmd,
        |id| Account::empty(ProfileId::from(id)),
    ) {
        return errors::dispatch_error_to_response(e);
    }

    let mut profile = ctx.profile().clone();
    if let Some(name) = body.display_name {
        profile.display_name = name.trim().to_string();
    }
    if let Some(url) = body.avatar_url {
        profile.avatar_url = Some(url);
    }
    if let Some(bio) = body.bio {
        profile.bio = Some(bio);
    }

    if let Err(e) = services.sessions.refresh_profile(profile.clone()) {
        return errors::auth_error_to_response(e);
    }

    services
        .notices
        .push_info(profile_id, "Profile updated", None);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": profile.id,
            "display_name": profile.display_name,
            "avatar_url": profile.avatar_url,
            "bio": profile.bio,
        })),
    )
        .into_response()
}
