use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use campus_auth::{
    Account, AccountCommand, AccountStatus, DeactivateAccount, ReactivateAccount, RegisterAccount,
    Role,
};
use campus_core::{AggregateId, ProfileId};

use crate::app::routes::admin_only;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    admin_only(
        Router::new()
            .route("/", get(list_users).post(create_user))
            .route("/:id/deactivate", post(deactivate_user))
            .route("/:id/activate", post(activate_user)),
    )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::UserListQuery>,
) -> axum::response::Response {
    let role = match query.role.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_role",
                    "role must be one of: admin, instructor, student",
                );
            }
        },
    };

    let status = match query.status.as_deref() {
        None => None,
        Some("active") => Some(AccountStatus::Active),
        Some("inactive") => Some(AccountStatus::Inactive),
        Some(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_status",
                "status must be one of: active, inactive",
            );
        }
    };

    let mut accounts = services.accounts.list();

    if let Some(role) = role {
        accounts.retain(|a| a.role == role);
    }
    if let Some(status) = status {
        accounts.retain(|a| a.status == status);
    }
    if let Some(text) = query.q.as_deref() {
        let needle = text.trim().to_lowercase();
        if !needle.is_empty() {
            accounts.retain(|a| {
                a.display_name.to_lowercase().contains(&needle)
                    || a.email.to_lowercase().contains(&needle)
            });
        }
    }

    accounts.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    let items = accounts.iter().map(dto::account_to_json).collect();
    (StatusCode::OK, Json(dto::collection(items))).into_response()
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let Ok(role) = body.role.parse::<Role>() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_role",
            "role must be one of: admin, instructor, student",
        );
    };

    if services.accounts.get_by_email(&body.email).is_some() {
        return errors::json_error(
            StatusCode::CONFLICT,
            "email_taken",
            "an account with this email already exists",
        );
    }

    let profile_id = ProfileId::new();
    let aggregate_id = AggregateId::from(profile_id);

    let cmd = AccountCommand::Register(RegisterAccount {
        profile_id,
        email: body.email,
        display_name: body.name,
        role,
        avatar_url: body.avatar,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Account>(aggregate_id, "auth.account", cmd, |id| {
        Account::empty(ProfileId::from(id))
    }) {
        Ok(_) => {
            services.notices.push_info(
                ctx.profile_id(),
                "User created",
                Some(format!("Created as {role}")),
            );
            (
                StatusCode::CREATED,
                Json(serde_json::json!({"id": profile_id.to_string()})),
            )
                .into_response()
        }
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(profile_id) = id.parse::<ProfileId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
    };

    let cmd = AccountCommand::Deactivate(DeactivateAccount {
        profile_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Account>(AggregateId::from(profile_id), "auth.account", cmd, |id| {
        Account::empty(ProfileId::from(id))
    }) {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"id": id}))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(profile_id) = id.parse::<ProfileId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
    };

    let cmd = AccountCommand::Reactivate(ReactivateAccount {
        profile_id,
        occurred_at: Utc::now(),
    });

    match services.dispatch::<Account>(AggregateId::from(profile_id), "auth.account", cmd, |id| {
        Account::empty(ProfileId::from(id))
    }) {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({"id": id}))).into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
