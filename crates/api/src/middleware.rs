use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use campus_auth::SessionManager;

use crate::app::errors;
use crate::context::SessionContext;
use crate::guard::{self, GuardDecision, RoleGate};

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionManager>,
}

/// Resolve the bearer token against the active session and guard the route.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let session = bearer_token(req.headers())
        .and_then(|token| state.sessions.authenticate(token));

    match guard::evaluate(state.sessions.phase(), session) {
        GuardDecision::Placeholder => Err(errors::session_loading_response()),
        GuardDecision::RedirectToLogin => Err(errors::unauthenticated_response()),
        GuardDecision::Proceed(ctx) => {
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
    }
}

/// Admin-only views (user management).
pub async fn require_admin(
    Extension(ctx): Extension<SessionContext>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    match guard::admin_gate(ctx.role()) {
        RoleGate::Allow => Ok(next.run(req).await),
        RoleGate::RedirectToRoot => Err(errors::forbidden_response()),
    }
}

/// Staff views (course authoring, materials upload, calendar management).
pub async fn require_staff(
    Extension(ctx): Extension<SessionContext>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    match guard::staff_gate(ctx.role()) {
        RoleGate::Allow => Ok(next.run(req).await),
        RoleGate::RedirectToRoot => Err(errors::forbidden_response()),
    }
}

/// Student-side actions (enrolling, recording progress).
pub async fn require_student(
    Extension(ctx): Extension<SessionContext>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    match guard::student_gate(ctx.role()) {
        RoleGate::Allow => Ok(next.run(req).await),
        RoleGate::RedirectToRoot => Err(errors::forbidden_response()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    Uuid::parse_str(token).ok()
}
