//! Browser telemetry agent injection.
//!
//! Wraps a telemetry vendor's browser agent (e.g. the New Relic loader) in an
//! IIFE that receives the account configuration, so the agent script itself
//! stays a static file while the config is supplied at startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::csp::csp_sha256;

/// DOM id of the injected telemetry script tag.
pub const TELEMETRY_SCRIPT_ID: &str = "telemetry-agent";

/// Telemetry account configuration, as written in the settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryConfig {
    pub application_id: String,
    pub account_id: String,
    pub trust_key: String,
    pub licence_key: String,
    /// Defaults to `application_id` when absent.
    pub agent_id: Option<String>,
    /// Path to the vendor browser-agent script on disk.
    pub agent_script: PathBuf,
}

/// The validated config object passed into the agent IIFE.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentConfig<'a> {
    application_id: &'a str,
    account_id: &'a str,
    trust_key: &'a str,
    licence_key: &'a str,
    agent_id: &'a str,
}

/// Produce the telemetry script fragment and its CSP hash token.
///
/// Incomplete configuration or an unreadable agent script logs a warning and
/// yields no fragment; telemetry is never worth failing the page for.
pub fn telemetry_fragment(config: Option<&TelemetryConfig>) -> Option<(String, String)> {
    let config = config?;

    let required = [
        &config.application_id,
        &config.account_id,
        &config.trust_key,
        &config.licence_key,
    ];
    if required.iter().any(|value| value.is_empty()) {
        tracing::warn!("invalid telemetry configuration: empty account fields, skipping agent");
        return None;
    }

    let agent_source = match std::fs::read_to_string(&config.agent_script) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!(
                file = %config.agent_script.display(),
                error = %err,
                "cannot read telemetry agent script, skipping agent"
            );
            return None;
        }
    };

    let agent_config = AgentConfig {
        application_id: &config.application_id,
        account_id: &config.account_id,
        trust_key: &config.trust_key,
        licence_key: &config.licence_key,
        agent_id: config.agent_id.as_deref().unwrap_or(&config.application_id),
    };
    let config_json = serde_json::to_string(&agent_config).expect("agent config serializes");

    let code = format!("((nrConfig) => {{ {agent_source} }})({config_json});");
    let sha = csp_sha256(&code);
    let fragment =
        format!(r#"<script id="{TELEMETRY_SCRIPT_ID}" type="text/javascript">{code}</script>"#);
    Some((fragment, sha))
}
