use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facade_server::settings::ServerSettings;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facade_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings_path = std::env::var("FACADE_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("facade.settings.json"));

    let settings = match ServerSettings::load_from_file(settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    let app = match facade_server::build_app(settings) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("\n  Facade Server running!\n");
    println!("   App:          http://localhost:{}/", port);
    println!("   API proxy:    http://localhost:{}/api", port);
    println!("   Health:       http://localhost:{}/health\n", port);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
