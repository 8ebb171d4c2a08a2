//! Reverse proxy for API calls.
//!
//! Requests under `<appPrefix>/api` are forwarded to the configured backend
//! with the prefix rewritten to `/api`. Proxied responses get the fixed API
//! CSP and are never cacheable.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Response, StatusCode},
    response::IntoResponse,
};

use crate::csp::API_CSP;
use crate::AppState;

const NO_STORE: HeaderValue =
    HeaderValue::from_static("private, no-cache, no-store, must-revalidate, max-age=0, s-maxage=0");

pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let (parts, body) = request.into_parts();

    let api_mount = state.settings.app_path("/api");
    let rest = parts
        .uri
        .path()
        .strip_prefix(api_mount.as_str())
        .unwrap_or("");
    let query = parts
        .uri
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let target = format!(
        "{}/api{}{}",
        state.settings.target_server_url.trim_end_matches('/'),
        rest,
        query
    );

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read proxied request body");
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };

    let mut headers = parts.headers.clone();
    headers.remove(header::HOST);

    let upstream = state
        .http
        .request(parts.method.clone(), &target)
        .headers(headers)
        .body(body_bytes)
        .send()
        .await;

    let upstream = match upstream {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(%target, error = %err, "proxied API request failed");
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    // The server's own CORS layer decides what origins are allowed.
    response_headers.remove(header::ACCESS_CONTROL_ALLOW_ORIGIN);
    response_headers.remove(header::TRANSFER_ENCODING);
    response_headers.remove(header::CONNECTION);

    let body = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%target, error = %err, "failed to read proxied response body");
            return (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response();
        }
    };

    let mut response = Response::builder()
        .status(status)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response());

    let headers = response.headers_mut();
    for (name, value) in response_headers.iter() {
        headers.insert(name, value.clone());
    }
    headers.insert(header::CACHE_CONTROL, NO_STORE);
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(API_CSP),
    );

    response
}
