//! Index document assembly.
//!
//! Resolves and reads the index HTML from the client build and runs the
//! script injector over it. Happens once at startup; the result is immutable
//! afterwards.

use std::path::{Path, PathBuf};

use crate::inject::inject_scripts;

/// Minimal document served when the index HTML cannot be read. Never fails
/// the response path.
pub const FALLBACK_PAGE: &str =
    r#"<html lang="en"><body>Unable to load the page you requested</body></html>"#;

/// Resolve the index document: a configured full path, a configured name
/// under the build path, or the default `index.html` under the build path.
fn resolve_index_filename(filename: Option<&str>, client_build_path: &Path) -> PathBuf {
    let default_path = client_build_path.join("index.html");
    let Some(filename) = filename else {
        return default_path;
    };

    let as_given = PathBuf::from(filename);
    if as_given.exists() {
        return as_given;
    }

    let in_build_path = client_build_path.join(filename);
    if in_build_path.exists() {
        return in_build_path;
    }

    tracing::warn!(
        configured = %filename,
        fallback = %default_path.display(),
        "configured index file not found, reverting to default"
    );
    default_path
}

/// Load the index document and inject the given script fragments.
pub fn load_index_html(
    filename: Option<&str>,
    client_build_path: &Path,
    env_script: &str,
    extra_fragments: &[Option<String>],
) -> String {
    let index_path = resolve_index_filename(filename, client_build_path);

    match std::fs::read_to_string(&index_path) {
        Ok(html) => inject_scripts(&html, env_script, extra_fragments),
        Err(err) => {
            tracing::error!(file = %index_path.display(), error = %err, "could not read index file");
            FALLBACK_PAGE.to_string()
        }
    }
}
