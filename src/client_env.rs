//! Runtime client environment injection.
//!
//! Reads `client.env.<nodeEnv>` from the client build and turns it into a
//! single inline script assigning the settings to a window global. The script
//! body is hashed before it is wrapped, and the wrapper never alters the body,
//! so the CSP hash token always matches what the browser computes.

use std::path::Path;

use serde_json::{Map, Value};

use crate::csp::csp_sha256;

/// DOM id of the injected env script tag.
pub const ENV_SCRIPT_ID: &str = "global-env-settings";

/// Build the inline assignment for a dotted window global name.
///
/// A single-part name assigns directly: `window["name"]={...};`. A multi-part
/// name nests the remaining parts as object keys, e.g. `process.env` becomes
/// `window["process"]={"env":{...}};`. Key order in the JSON body follows map
/// insertion order.
pub fn global_env_script(global_name: &str, vars: &Map<String, Value>) -> String {
    let json = Value::Object(vars.clone()).to_string();

    let parts: Vec<&str> = global_name.split('.').collect();
    let mut script = json;
    for part in parts[1..].iter().rev() {
        script = format!("{{\"{part}\":{script}}}");
    }

    format!("window[\"{}\"]={};", parts[0], script)
}

/// Load the env var map served to the client: `NODE_ENV` and `APP_ENV` first,
/// then the entries of `client.env.<node_env>` in file order. A missing or
/// unreadable file is not fatal; there may simply be nothing to inject.
pub fn load_client_env(client_build_path: &Path, node_env: &str) -> Map<String, Value> {
    let mut vars = Map::new();
    vars.insert("NODE_ENV".to_string(), Value::String("production".to_string()));
    vars.insert("APP_ENV".to_string(), Value::String(node_env.to_string()));

    let filename = client_build_path.join(format!("client.env.{node_env}"));
    match dotenvy::from_path_iter(&filename) {
        Ok(entries) => {
            tracing::info!(file = %filename.display(), "injecting client env settings");
            for entry in entries {
                match entry {
                    Ok((key, value)) => {
                        vars.insert(key, Value::String(value));
                    }
                    Err(err) => {
                        tracing::warn!(file = %filename.display(), error = %err, "skipping malformed client env entry");
                    }
                }
            }
        }
        Err(_) => {
            tracing::warn!(file = %filename.display(), "client env file missing, injecting base settings only");
        }
    }

    vars
}

/// Produce the complete env script fragment and its CSP hash token.
pub fn client_env_fragment(
    global_name: &str,
    client_build_path: &Path,
    node_env: &str,
) -> (String, String) {
    let vars = load_client_env(client_build_path, node_env);
    let code = global_env_script(global_name, &vars);
    let sha = csp_sha256(&code);
    let fragment = format!(r#"<script id="{ENV_SCRIPT_ID}" type="text/javascript">{code}</script>"#);
    (fragment, sha)
}
