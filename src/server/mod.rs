// src/server/mod.rs
// =============================================================================
// This module runs the HTTP service for 'serve' mode.
//
// What it sets up:
// - The axum Router with the /scrape and /health routes
// - CORS for the local front-end dev servers
// - Request tracing through tower-http's TraceLayer
//
// Rust concepts:
// - Arc: The app state is shared by all requests without copying it
// - Layers: Middleware wrapped around the router (CORS, tracing)
// =============================================================================

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use routes::AppState;

// Front-end dev servers allowed to call us from the browser
const ALLOWED_ORIGINS: [&str; 5] = [
    "http://localhost:5173",
    "http://localhost:8081",
    "http://localhost:8080",
    "http://localhost:3000",
    "http://localhost:3002",
];

// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scrape", get(routes::scrape_get).post(routes::scrape_post))
        .route("/health", get(routes::health))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// Credentials are allowed, so methods and headers are mirrored from the
// request instead of using a wildcard (which tower-http rejects in that case)
fn cors_layer() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.into_iter().map(HeaderValue::from_static);

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

// Binds to `addr` and serves until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting server on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
