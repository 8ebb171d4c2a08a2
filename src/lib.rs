//! Hosting server for single-page application builds.
//!
//! Serves the built client assets, injects runtime env/config/telemetry
//! scripts into the index document, composes a matching Content-Security-
//! Policy, and proxies API calls to the backend. All document and policy
//! assembly happens once at startup; request handlers only read the
//! precomputed artifacts.

pub mod client_env;
pub mod csp;
pub mod document;
pub mod headers;
pub mod inject;
pub mod json_config;
pub mod routes;
pub mod settings;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::csp::PolicyTable;
use crate::settings::ServerSettings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ServerSettings>,
    /// Index document with all scripts injected, served as-is.
    pub index_html: Arc<String>,
    /// Composed Content-Security-Policy, set on every response.
    pub csp_header: HeaderValue,
    /// Client used by the API proxy.
    pub http: reqwest::Client,
}

/// Compose the immutable request-handling artifacts from the settings:
/// script fragments, CSP header, assembled index document.
pub fn build_state(settings: ServerSettings) -> anyhow::Result<AppState> {
    settings.validate()?;

    let build_path = &settings.client_build_path;
    let node_env = &settings.node_env;

    let (env_fragment, env_sha) = client_env::client_env_fragment(
        &settings.index_options.global_client_env_variable_name,
        build_path,
        node_env,
    );

    let json_config = settings
        .use_json_configuration
        .then(|| {
            json_config::json_config_fragment(
                build_path,
                node_env,
                &settings.index_options.global_json_config_variable_name,
            )
        })
        .flatten();

    let telemetry = telemetry::telemetry_fragment(settings.telemetry.as_ref());

    // Hashes must be computed before the policy; the header has to describe
    // exactly the scripts injected below.
    let table = PolicyTable::default();
    let csp = csp::compose_header(
        &table,
        &settings.csp_options,
        &[
            Some(env_sha.as_str()),
            json_config.as_ref().map(|(_, sha)| sha.as_str()),
            telemetry.as_ref().map(|(_, sha)| sha.as_str()),
        ],
    );
    let csp_header = HeaderValue::from_str(&csp)?;

    let index_html = document::load_index_html(
        settings.index_options.filename.as_deref(),
        build_path,
        &env_fragment,
        &[
            json_config.map(|(fragment, _)| fragment),
            telemetry.map(|(fragment, _)| fragment),
        ],
    );

    Ok(AppState {
        settings: Arc::new(settings),
        index_html: Arc::new(index_html),
        csp_header,
        http: reqwest::Client::new(),
    })
}

/// Build the full router over a prepared state.
pub fn router(state: AppState) -> Router {
    let api_mount = state.settings.app_path("/api");
    let prefix_mount = state.settings.app_path("");

    let mut app = Router::new()
        .route("/health", get(routes::health_handler))
        .route("/", get(routes::index_handler))
        .route("/index.html", get(routes::index_handler));

    if prefix_mount != "/" {
        app = app.route(&prefix_mount, get(routes::index_handler));
    }

    app.route(&api_mount, any(routes::proxy_handler))
        .route(&format!("{api_mount}/*rest"), any(routes::proxy_handler))
        .fallback(get(routes::assets_handler))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state.clone(), headers::blacklist_filter))
        .layer(middleware::from_fn_with_state(state.clone(), headers::security_headers))
        .layer(middleware::from_fn_with_state(state.clone(), headers::method_filter))
        .layer(headers::cors_layer(
            &state.settings.cors_options,
            &state.settings.allowed_methods,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Convenience: settings in, servable router out.
pub fn build_app(settings: ServerSettings) -> anyhow::Result<Router> {
    Ok(router(build_state(settings)?))
}
