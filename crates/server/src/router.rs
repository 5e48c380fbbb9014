//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Assemble all routes and middleware into a single `Router`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/ingest", post(api::ingest))
        .route("/flush", post(api::flush))
        .route("/connectivity", post(api::connectivity))
        .route("/status", get(api::status))
        .route("/patients/{id}/history", get(api::patient_history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
