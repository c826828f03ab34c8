mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/stadiums", get(handlers::stadium_list))
        .route("/api/categories", get(handlers::category_list))
        .route("/api/services", get(handlers::service_list))
        .route("/api/services/refresh", post(handlers::refresh_services))
        .route("/api/reports", post(handlers::submit_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API; kicks off one resolution of the configured address list first.
pub async fn start(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    // Runs in the background; the handle is not needed to observe the result.
    let _ = state.services.request(state.addresses.clone());

    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(%addr, error = %e, "cannot bind");
        e
    })?;

    info!("Family+ API listening on http://{}", addr);
    axum::serve(listener, app).await
}
