//! Static asset serving with SPA fallback.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

use axum::{
    body::Body,
    extract::{Host, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use httpdate::HttpDate;

use crate::AppState;

/// Serve a file from the client build. Unknown paths fall back to the
/// assembled index document so the front-end router can handle the route.
pub async fn assets_handler(
    State(state): State<AppState>,
    Host(host): Host,
    uri: Uri,
) -> Response {
    let relative = resource_relative_path(&state, uri.path());

    let safe_path = match sanitize_path(&relative) {
        Ok(path) => path,
        Err(reason) => {
            tracing::warn!(path = %uri.path(), %reason, "rejected static resource path");
            return (StatusCode::BAD_REQUEST, "Invalid resource path").into_response();
        }
    };

    let full_path = state.settings.client_build_path.join(&safe_path);
    let content = match tokio::fs::read(&full_path).await {
        Ok(content) => content,
        Err(_) => {
            // Not a build asset; let the front-end app process the route.
            return Html(state.index_html.as_ref().clone()).into_response();
        }
    };

    let mime = mime_guess::from_path(&full_path).first_or_octet_stream();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref());

    if !is_localhost(&host) {
        let expires_time = SystemTime::now()
            .checked_add(Duration::from_secs(86400))
            .unwrap_or_else(SystemTime::now);
        let expires_http = HttpDate::from(expires_time).to_string();
        builder = builder
            .header(header::CACHE_CONTROL, "public, max-age=86400")
            .header(header::EXPIRES, expires_http);
    }

    builder
        .body(Body::from(content))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Strip the app prefix so assets resolve relative to the build root.
fn resource_relative_path(state: &AppState, path: &str) -> String {
    let prefix = &state.settings.app_prefix;
    if prefix.is_empty() {
        return path.to_string();
    }

    let mounted = state.settings.app_path("");
    match path.strip_prefix(mounted.as_str()) {
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

fn sanitize_path(path: &str) -> Result<PathBuf, &'static str> {
    let trimmed = path.trim_start_matches('/');
    let decoded = percent_encoding::percent_decode_str(trimmed)
        .decode_utf8()
        .map_err(|_| "invalid UTF-8 in path")?;

    let path = Path::new(decoded.as_ref());
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err("directory traversal not allowed");
        }
    }

    Ok(path.to_path_buf())
}

fn is_localhost(host: &str) -> bool {
    let host_without_port = host.split(':').next().unwrap_or(host);
    host_without_port == "localhost" || host_without_port == "127.0.0.1"
}
