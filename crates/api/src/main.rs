use std::path::PathBuf;

#[tokio::main]
async fn main() {
    campus_observability::init();

    let state_dir = std::env::var("CAMPUS_STATE_DIR").ok().map(PathBuf::from);
    if state_dir.is_none() {
        tracing::warn!("CAMPUS_STATE_DIR not set; sessions will not survive restarts");
    }

    let app = campus_api::app::build_app(state_dir).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
