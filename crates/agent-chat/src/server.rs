//! Static file server for the browser front end

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::progress::StatusLine;

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 Not Found")
}

/// Serve files under `dir`; directories resolve to their `index.html`
pub fn router(dir: impl AsRef<Path>) -> Router {
    let files = ServeDir::new(dir.as_ref())
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

/// Bind `port` on all interfaces and serve until Ctrl+C
pub async fn serve(port: u16, dir: PathBuf) -> Result<()> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Static directory does not exist; every request will 404");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, dir = %dir.display(), "Static server listening");
    StatusLine::new().info(format!(
        "Serving {} at http://localhost:{}",
        dir.display(),
        port
    ));

    axum::serve(listener, router(&dir))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Static server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn get(dir: &Path, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router(dir)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8_lossy(&body).into_owned())
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>chat</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.html"), "docs").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let (status, content_type, body) = get(dir.path(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert_eq!(body, "<h1>chat</h1>");
    }

    #[tokio::test]
    async fn test_nested_directory_index() {
        let dir = site();
        let (status, _, body) = get(dir.path(), "/docs/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "docs");
    }

    #[tokio::test]
    async fn test_content_type_from_extension() {
        let dir = site();
        let (status, content_type, _) = get(dir.path(), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().contains("javascript"));
    }

    #[tokio::test]
    async fn test_missing_file_is_plain_404() {
        let dir = site();
        let (status, _, body) = get(dir.path(), "/nope.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 Not Found");
    }
}
