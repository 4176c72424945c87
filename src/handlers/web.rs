//! Embedded UI serving
//!
//! Paths with a file extension are looked up in [`WebAssets`]; every other
//! non-API path falls back to `index.html` so the single-page view loads.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::embedded::WebAssets;

pub async fn serve_static_files(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.starts_with("api/") || path == "api" || path.starts_with("api-docs") {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    if let Some(file) = WebAssets::get(path) {
        return asset_response(get_content_type(path), file.data.into_owned());
    }

    index_response().unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not Found").into_response())
}

/// `index.html`, if it was embedded
pub fn index_response() -> Option<Response> {
    WebAssets::get("index.html").map(|index| {
        asset_response(
            HeaderValue::from_static("text/html; charset=utf-8"),
            index.data.into_owned(),
        )
    })
}

fn asset_response(content_type: HeaderValue, data: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type)], Body::from(data)).into_response()
}

/// Content type from the file extension
fn get_content_type(path: &str) -> HeaderValue {
    let ext = path.rsplit('.').next().unwrap_or("");
    let content_type = match ext {
        "html" => "text/html; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    };
    HeaderValue::from_static(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(get_content_type("app.js"), "application/javascript; charset=utf-8");
        assert_eq!(get_content_type("style.css"), "text/css; charset=utf-8");
        assert_eq!(get_content_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(get_content_type("blob"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_api_paths_are_not_served_as_ui() {
        let response = serve_static_files(Uri::from_static("/api/unknown")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_spa_fallback_serves_index() {
        let response = serve_static_files(Uri::from_static("/history/some-id")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_index_offers_fixed_language_list() {
        let index = WebAssets::get("index.html").unwrap();
        let html = std::str::from_utf8(&index.data).unwrap();

        assert!(html.contains(r#"<select id="language""#));
        for lang in ["javascript", "python", "java", "csharp", "cpp", "php", "ruby", "go", "rust", "swift"] {
            assert!(html.contains(&format!(r#"<option value="{}">"#, lang)), "missing {}", lang);
        }
    }

    #[tokio::test]
    async fn test_serves_embedded_script() {
        let response = serve_static_files(Uri::from_static("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/javascript; charset=utf-8"
        );
    }
}
