//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (event store/bus, projections,
//!   session manager, notices)
//! - `routes/`: HTTP routes + handlers (one file per page area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `seed.rs`: demo fixtures, dispatched through the normal command path

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod notices;
pub mod routes;
pub mod seed;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `state_dir` is where the session record is persisted; without one,
/// sessions live only as long as the process (tests, dev).
pub async fn build_app(state_dir: Option<PathBuf>) -> Router {
    let services = services::build_services(state_dir.as_deref()).await;
    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
    };

    // Protected routes: require an authenticated session.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::session_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
