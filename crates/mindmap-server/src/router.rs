//! Axum router setup for the mindmap server

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{
    assets::static_handler,
    handlers::{get_catalog, get_document, get_scene, health_check, post_document, post_export},
    websocket::ws_handler,
    ServerState,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for actions and scene diffs
        .route("/ws", get(ws_handler))
        // REST API endpoints
        .route("/api/health", get(health_check))
        .route("/api/catalog", get(get_catalog))
        .route("/api/scene", get(get_scene))
        .route("/api/document", get(get_document).post(post_document))
        .route("/api/export", post(post_export))
        // Static file serving
        .route("/", get(static_handler))
        .route("/*path", get(static_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
