use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use facade_server::settings::{CorsOptions, ServerSettings};

// The env script body for default settings (no client.env file present):
// window["process"]={"env":{"NODE_ENV":"production","APP_ENV":"development"}};
const ENV_SCRIPT_SHA: &str = "'sha256-ya9AKG4WF8q697jDT09vVD68RFIdUXR9RWbx7fakdm8='";

fn test_settings(build_dir: &TempDir) -> ServerSettings {
    ServerSettings {
        target_server_url: "http://localhost:9999".to_string(),
        client_build_path: build_dir.path().to_path_buf(),
        cors_options: CorsOptions {
            allowed_origins: vec!["*".to_string()],
        },
        ..ServerSettings::default()
    }
}

fn create_test_app() -> (Router, TempDir) {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        build_dir.path().join("index.html"),
        "<html><head><title>App</title><script src=\"/main.js\"></script></head><body></body></html>",
    )
    .unwrap();
    std::fs::write(build_dir.path().join("main.js"), "console.log('app');").unwrap();

    let app = facade_server::build_app(test_settings(&build_dir)).unwrap();
    (app, build_dir)
}

async fn send(app: Router, method: &str, uri: &str) -> axum::http::Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "app.example.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/health").await;

    let headers = response.headers();
    assert_eq!(
        headers.get("strict-transport-security").unwrap(),
        "max-age=31536000"
    );
    assert_eq!(headers.get("x-frame-options").unwrap(), "SAMEORIGIN");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "no-referrer-when-downgrade"
    );
}

#[tokio::test]
async fn test_csp_header_describes_injected_env_script() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/").await;

    let csp = response
        .headers()
        .get("content-security-policy")
        .expect("CSP header should be present")
        .to_str()
        .unwrap()
        .to_string();

    assert!(csp.starts_with("default-src 'self'; "));
    assert!(csp.contains(&format!("script-src-elem 'self' {ENV_SCRIPT_SHA}")));
    assert!(csp.contains("frame-ancestors 'none'"));
    assert!(csp.ends_with("object-src 'none'"));
}

#[tokio::test]
async fn test_csp_service_tokens_appear_when_selected() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();

    let mut settings = test_settings(&build_dir);
    settings.csp_options.services = vec!["hotjar".to_string()];
    let app = facade_server::build_app(settings).unwrap();

    let response = send(app, "GET", "/health").await;
    let csp = response
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(csp.contains("https://static.hotjar.com"));
    assert!(csp.contains("https://vars.hotjar.com"));
    // Unselected services stay out.
    assert!(!csp.contains("newrelic"));
}

#[tokio::test]
async fn test_index_has_env_script_before_existing_scripts() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;

    let env_pos = html.find("id=\"global-env-settings\"").expect("env script injected");
    let app_script_pos = html.find("src=\"/main.js\"").unwrap();
    assert!(env_pos < app_script_pos, "env script must precede app scripts");
    assert!(html.contains(
        r#"window["process"]={"env":{"NODE_ENV":"production","APP_ENV":"development"}};"#
    ));
}

#[tokio::test]
async fn test_json_config_script_injected_and_hashed() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();
    std::fs::write(
        build_dir.path().join("config.development.json"),
        r#"{"apiUrl":"https://api.example.com"}"#,
    )
    .unwrap();

    let mut settings = test_settings(&build_dir);
    settings.use_json_configuration = true;
    let app = facade_server::build_app(settings).unwrap();

    let response = send(app, "GET", "/").await;
    let csp = response
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let html = body_string(response).await;

    assert!(html.contains(
        r#"<script id="global-config-settings" type="text/javascript">window["__APP_CONFIG__"]={"apiUrl":"https://api.example.com"};</script>"#
    ));

    // Two injected scripts, two hash tokens.
    let hash_count = csp.matches("'sha256-").count();
    assert_eq!(hash_count, 2);

    // Env script first, config script second.
    let env_pos = html.find("global-env-settings").unwrap();
    let config_pos = html.find("global-config-settings").unwrap();
    assert!(env_pos < config_pos);
}

#[tokio::test]
async fn test_static_asset_served_with_content_type() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/main.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("javascript"));
    assert_eq!(body_string(response).await, "console.log('app');");
}

#[tokio::test]
async fn test_static_asset_cache_headers_off_localhost() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/main.js").await;

    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=86400"
    );
    assert!(response.headers().contains_key("expires"));
}

#[tokio::test]
async fn test_static_asset_no_cache_headers_on_localhost() {
    let (app, _dir) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/main.js")
                .header("host", "localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response.headers().contains_key("cache-control"));
}

#[tokio::test]
async fn test_unknown_route_falls_back_to_index() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/some/client/route").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("global-env-settings"));
}

#[tokio::test]
async fn test_path_traversal_rejected() {
    let (app, _dir) = create_test_app();

    let response = send(app, "GET", "/assets/%2e%2e/%2e%2e/etc/passwd").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disallowed_method_gets_405() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();

    let mut settings = test_settings(&build_dir);
    settings.allowed_methods = vec!["GET".to_string()];
    let app = facade_server::build_app(settings).unwrap();

    let response = send(app, "POST", "/").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_blacklisted_path_gets_403() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();

    let mut settings = test_settings(&build_dir);
    settings.blacklist_paths = vec!["/api/v1/users".to_string()];
    let app = facade_server::build_app(settings).unwrap();

    let response = send(app, "GET", "/api/v1/users").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(response).await, "Path blacklisted");
}

#[tokio::test]
async fn test_missing_index_serves_fallback_page() {
    let build_dir = tempfile::tempdir().unwrap();
    // No index.html written.
    let app = facade_server::build_app(test_settings(&build_dir)).unwrap();

    let response = send(app, "GET", "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Unable to load the page you requested"));
}

#[tokio::test]
async fn test_app_prefix_mounts_index_and_strips_assets() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();
    std::fs::write(build_dir.path().join("app.css"), "body{}").unwrap();

    let mut settings = test_settings(&build_dir);
    settings.app_prefix = "portal".to_string();
    let app = facade_server::build_app(settings).unwrap();

    let response = send(app.clone(), "GET", "/portal").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("global-env-settings"));

    let response = send(app, "GET", "/portal/app.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "body{}");
}

#[tokio::test]
async fn test_client_env_file_values_reach_the_document() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(build_dir.path().join("index.html"), "<head></head>").unwrap();
    std::fs::write(
        build_dir.path().join("client.env.development"),
        "API_URL=https://api.example.com\n",
    )
    .unwrap();

    let app = facade_server::build_app(test_settings(&build_dir)).unwrap();

    let response = send(app, "GET", "/").await;
    let html = body_string(response).await;
    assert!(html.contains(r#""API_URL":"https://api.example.com""#));
}

#[tokio::test]
async fn test_legacy_env_script_removed_from_served_document() {
    let build_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        build_dir.path().join("index.html"),
        "<head><script>window.process = { env: { VITE_ENVIRONMENT: \"uat\" } }</script></head>",
    )
    .unwrap();

    let app = facade_server::build_app(test_settings(&build_dir)).unwrap();

    let response = send(app, "GET", "/").await;
    let html = body_string(response).await;

    assert!(!html.contains("VITE_ENVIRONMENT"));
    assert!(html.contains("global-env-settings"));
}
