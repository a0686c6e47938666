//! Static file serving using rust-embed

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embed the client directory at compile time
#[derive(RustEmbed)]
#[folder = "../../client"]
struct ClientAssets;

fn asset_response(path: &str, content_type: &str) -> Option<Response> {
    let content = ClientAssets::get(path)?;
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.to_string())],
            content.data.into_owned(),
        )
            .into_response(),
    )
}

/// Serve static files from the embedded client directory
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Default to index.html for root path
    let path = if path.is_empty() { "index.html" } else { path };

    let mime_type = mime_guess::from_path(path).first_or_text_plain();
    asset_response(path, mime_type.as_ref())
        // Unknown paths get the page itself
        .or_else(|| asset_response("index.html", "text/html"))
        .unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not Found").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_exist() {
        assert!(ClientAssets::get("index.html").is_some());
        assert!(ClientAssets::get("app.js").is_some());
        assert!(ClientAssets::get("style.css").is_some());
    }

    #[test]
    fn test_nonexistent_asset() {
        assert!(ClientAssets::get("nonexistent.file").is_none());
    }

    #[tokio::test]
    async fn test_script_served_with_js_mime() {
        let response = static_handler(Uri::from_static("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"), "{content_type}");
    }
}
