//! JSON runtime-configuration injection.
//!
//! Loads `config.<nodeEnv>.json` from the client build and injects it as a
//! window global. The file is re-serialized compactly so the script body is a
//! single line with stable key order, keeping the CSP hash reproducible.

use std::path::Path;

use crate::csp::csp_sha256;

/// DOM id of the injected config script tag.
pub const CONFIG_SCRIPT_ID: &str = "global-config-settings";

/// Produce the JSON config fragment and its CSP hash token.
///
/// Any failure (missing file, invalid JSON) is logged and degrades to no
/// fragment: the page still serves, just without runtime configuration.
pub fn json_config_fragment(
    client_build_path: &Path,
    node_env: &str,
    global_name: &str,
) -> Option<(String, String)> {
    let path = client_build_path.join(format!("config.{node_env}.json"));

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(file = %path.display(), error = %err, "failed to load JSON config");
            return None;
        }
    };

    let parsed: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(file = %path.display(), error = %err, "failed to parse JSON config");
            return None;
        }
    };

    let code = format!("window[\"{global_name}\"]={parsed};");
    let sha = csp_sha256(&code);
    let fragment =
        format!(r#"<script id="{CONFIG_SCRIPT_ID}" type="text/javascript">{code}</script>"#);
    Some((fragment, sha))
}
