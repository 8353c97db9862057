//! Read-only HTTP view of the mounted bucket.
//!
//! `GET /<key>` returns the object stored under `<key>`. Anything that is not
//! a regular file below the root, including paths that try to climb out of
//! it, is a 404.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::ServeConfig;

pub fn router(root: PathBuf) -> Router {
    Router::new()
        .route("/{*key}", get(get_object))
        .with_state(Arc::new(root))
}

pub async fn serve(config: &ServeConfig) -> io::Result<()> {
    let listener = TcpListener::bind(&config.listen).await?;
    info!(addr = %listener.local_addr()?, root = %config.root.display(), "serving mirror");
    axum::serve(listener, router(config.root.clone())).await
}

async fn get_object(State(root): State<Arc<PathBuf>>, UrlPath(key): UrlPath<String>) -> Response {
    let Some(path) = resolve(&root, &key) else {
        debug!(key, "rejected path");
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return StatusCode::NOT_FOUND.into_response(),
    }

    match tokio::fs::read(&path).await {
        Ok(body) => body.into_response(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "read failed");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Join `key` onto `root`, refusing anything but plain path segments.
fn resolve(root: &Path, key: &str) -> Option<PathBuf> {
    let relative = Path::new(key);
    let mut components = relative.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| root.join(relative))
}
