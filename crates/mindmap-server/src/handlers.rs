//! REST API handlers for the mindmap server

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use mindmap_core::{document_file_name, CatalogEntry, Notice, Scene};
use mindmap_export::export_file_name;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::ServerState;

/// Catalog entries plus the category list the selection menu is built from.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub entries: Vec<CatalogEntry>,
    /// Sorted; clients address categories by 1-based index into this list.
    pub categories: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Scene plus the diff sequence it corresponds to.
#[derive(Debug, Serialize)]
pub struct SceneResponse {
    pub sequence: u64,
    pub scene: Scene,
}

fn attachment(content_type: &str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        body,
    )
        .into_response()
}

fn notice_response(status: StatusCode, notice: Notice) -> Response {
    (status, Json(notice)).into_response()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}

/// Get the loaded catalog
pub async fn get_catalog(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let catalog = session.diagram().catalog();
    Json(CatalogResponse {
        entries: catalog.entries().to_vec(),
        categories: catalog.categories().into_iter().map(str::to_string).collect(),
    })
}

/// Get the scene as clients currently know it
pub async fn get_scene(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(SceneResponse { sequence: session.sequence(), scene: session.published().clone() })
}

/// Download the current map as a JSON document
pub async fn get_document(State(state): State<Arc<ServerState>>) -> Response {
    let json = {
        let session = state.session.read().await;
        session.diagram().save_json()
    };
    match json {
        Ok(json) => {
            let name = document_file_name(chrono::Local::now().date_naive());
            info!("Map saved as {}", name);
            attachment("application/json", &name, json.into_bytes())
        }
        Err(e) => {
            warn!("Failed to save map: {}", e);
            notice_response(StatusCode::INTERNAL_SERVER_ERROR, Notice::from(&e))
        }
    }
}

/// Replace the map with an uploaded document. The client asks the user
/// before posting, so the load is confirmed here.
pub async fn post_document(
    State(state): State<Arc<ServerState>>,
    Json(document): Json<Value>,
) -> Response {
    let mut session = state.session.write().await;
    match session.diagram_mut().load(&document, |_| true) {
        Ok(notice) => {
            let update = state.publish(&mut session, notice.clone());
            match notice {
                Some(notice) => {
                    let status =
                        if notice.is_success() { StatusCode::OK } else { StatusCode::ACCEPTED };
                    (status, Json(update)).into_response()
                }
                None => StatusCode::NO_CONTENT.into_response(),
            }
        }
        Err(e) => {
            warn!("Rejected map document: {}", e);
            notice_response(StatusCode::BAD_REQUEST, Notice::from(&e))
        }
    }
}

/// Export the map as a PDF. The write lock is held for the whole export so
/// nothing can change the map while it is being captured.
pub async fn post_export(State(state): State<Arc<ServerState>>) -> Response {
    let mut session = state.session.write().await;
    let result = state.exporter.export(session.diagram_mut()).await;
    // The capture briefly moved the view; clients should see it restored.
    state.publish(&mut session, None);
    drop(session);

    match result {
        Ok(pdf) => {
            let name = export_file_name(chrono::Local::now().date_naive());
            info!("Exported {} ({} bytes)", name, pdf.len());
            attachment("application/pdf", &name, pdf)
        }
        Err(e) => {
            warn!("Export failed: {}", e);
            notice_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Notice::error(format!("Export failed: {e}")),
            )
        }
    }
}
