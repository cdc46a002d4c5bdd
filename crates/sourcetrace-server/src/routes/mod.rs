//! API routes for the sourcetrace server.

pub mod captures;
pub mod proofpacks;
pub mod sources;
pub mod timelines;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the main API router with all routes mounted.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Creates the v1 API routes.
fn api_v1_routes(state: AppState) -> Router {
    Router::new().nest(
        "/sources",
        sources::router(state.clone())
            .merge(captures::router(state.clone()))
            .merge(timelines::router(state.clone()))
            .merge(proofpacks::router(state)),
    )
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
