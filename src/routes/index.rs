use axum::{extract::State, response::Html};

use crate::AppState;

/// Serve the assembled index document. The document is composed once at
/// startup (env/config/telemetry scripts already injected) and reused for
/// every request.
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.index_html.as_ref().clone())
}
