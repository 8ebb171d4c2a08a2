//! Response-header and request-filtering middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

use crate::settings::CorsOptions;
use crate::AppState;

const HSTS: HeaderValue = HeaderValue::from_static("max-age=31536000");
const FRAME_OPTIONS: HeaderValue = HeaderValue::from_static("SAMEORIGIN");
const CONTENT_TYPE_OPTIONS: HeaderValue = HeaderValue::from_static("nosniff");
const REFERRER_POLICY: HeaderValue = HeaderValue::from_static("no-referrer-when-downgrade");

/// Set HSTS, the composed CSP and the standard hardening headers on every
/// response. The CSP only matters for the document response, but is set
/// everywhere: policies delivered with subresources are discarded by the
/// browser, so there is no downside.
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(header::STRICT_TRANSPORT_SECURITY, HSTS);
    headers.insert(header::CONTENT_SECURITY_POLICY, state.csp_header.clone());
    headers.insert(header::X_FRAME_OPTIONS, FRAME_OPTIONS);
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, CONTENT_TYPE_OPTIONS);
    headers.insert(header::REFERRER_POLICY, REFERRER_POLICY);

    response
}

/// Reject requests whose method is not in the configured allow list.
/// OPTIONS always passes so CORS preflight keeps working.
pub async fn method_filter(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let method = request.method();
    if *method != Method::OPTIONS && !state.settings.method_allowed(method.as_str()) {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }
    next.run(request).await
}

/// Build the CORS layer from the configured origins.
///
/// A `"*"` entry allows every origin but cannot be combined with
/// credentials; an explicit origin list gets credential support and the
/// configured method list.
pub fn cors_layer(cors: &CorsOptions, allowed_methods: &[String]) -> CorsLayer {
    if cors.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let methods: Vec<Method> = allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Reject requests to blacklisted paths before they reach the proxy.
pub async fn blacklist_filter(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let path = request.uri().path();
    if state.settings.blacklist_paths.iter().any(|p| p == path) {
        tracing::warn!(%path, "rejected request to blacklisted path");
        return (StatusCode::FORBIDDEN, "Path blacklisted").into_response();
    }
    next.run(request).await
}
