//! Content-Security-Policy composition.
//!
//! The policy is assembled from a static directive table ([`PolicyTable`]),
//! optional third-party service allowances, caller-supplied extension tokens
//! and the SHA-256 hashes of the inline scripts injected into the document.
//! Composition happens once at startup; the resulting header string is reused
//! verbatim for every response.

mod table;

pub use table::PolicyTable;

use base64::Engine;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Recognized third-party integrations whose CSP allowances can be enabled as
/// a group by naming the service in [`CspOptions::services`].
///
/// `Datadog` and `Sentry` are reserved for upcoming integrations and gate no
/// table entries yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    FullStory,
    GoogleAnalytics,
    GoogleFonts,
    GoogleTranslate,
    Hotjar,
    NewRelic,
    PowerBi,
    Datadog,
    Sentry,
}

impl Service {
    /// The wire name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Service::FullStory => "full-story",
            Service::GoogleAnalytics => "google-analytics",
            Service::GoogleFonts => "google-fonts",
            Service::GoogleTranslate => "google-translate",
            Service::Hotjar => "hotjar",
            Service::NewRelic => "newrelic",
            Service::PowerBi => "power-bi",
            Service::Datadog => "datadog",
            Service::Sentry => "sentry",
        }
    }
}

/// One entry of a directive's source list: a literal CSP token, optionally
/// gated on a [`Service`]. The first element of every directive list is the
/// directive name itself.
#[derive(Debug, Clone, Copy)]
pub struct PolicyElement {
    pub token: &'static str,
    pub service: Option<Service>,
}

impl PolicyElement {
    /// A token that is always included.
    pub const fn bare(token: &'static str) -> Self {
        Self { token, service: None }
    }

    /// A token included only when `service` is selected.
    pub const fn gated(token: &'static str, service: Service) -> Self {
        Self { token, service: Some(service) }
    }
}

/// Caller-supplied CSP configuration: the services to enable plus, per
/// directive, extra raw source tokens appended after the table entries.
///
/// `services` is kept as raw strings deliberately: an unknown service name
/// matches no table entry and silently has no effect, rather than failing
/// deserialization of the whole settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CspOptions {
    pub services: Vec<String>,
    pub script_src_elem_elements: Vec<String>,
    pub script_src_elements: Vec<String>,
    pub style_src_elements: Vec<String>,
    pub style_src_elem_elements: Vec<String>,
    pub font_src_elements: Vec<String>,
    pub img_src_elements: Vec<String>,
    pub manifest_src_elements: Vec<String>,
    pub connect_src_elements: Vec<String>,
    pub frame_src_elements: Vec<String>,
    pub frame_ancestors_elements: Vec<String>,
    pub object_src_elements: Vec<String>,
}

/// Fixed policy applied to proxied API responses, independent of the
/// composed document policy.
pub const API_CSP: &str = "default-src 'none'; script-src 'self'; style-src 'self'; \
     object-src 'none'; img-src 'self'; font-src 'self'; frame-ancestors 'none'; \
     block-all-mixed-content";

/// Compose a single directive's policy string.
///
/// Elements are kept in table order: unconditional tokens and tokens whose
/// service is in `services`, followed by the non-empty `extra` tokens in the
/// order supplied. Tokens are trusted configuration literals; no escaping or
/// validation is performed.
pub fn compose_policy(elements: &[PolicyElement], services: &[String], extra: &[String]) -> String {
    elements
        .iter()
        .filter(|e| match e.service {
            None => true,
            Some(svc) => services.iter().any(|s| s == svc.as_str()),
        })
        .map(|e| e.token)
        .chain(extra.iter().filter(|t| !t.is_empty()).map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compose the full `Content-Security-Policy` header value.
///
/// `dynamic_hashes` are the hash tokens of the inline scripts injected into
/// the served document (env, JSON config, telemetry); absent entries are
/// skipped. They extend `script-src-elem` after any configured extension
/// tokens. Directives are emitted in fixed declaration order.
pub fn compose_header(
    table: &PolicyTable,
    options: &CspOptions,
    dynamic_hashes: &[Option<&str>],
) -> String {
    let script_src_elem_extra: Vec<String> = options
        .script_src_elem_elements
        .iter()
        .cloned()
        .chain(dynamic_hashes.iter().flatten().map(|s| s.to_string()))
        .collect();

    let services = &options.services;
    let policies = [
        compose_policy(&table.default_src, services, &[]),
        compose_policy(&table.script_src_elem, services, &script_src_elem_extra),
        compose_policy(&table.script_src, services, &options.script_src_elements),
        compose_policy(&table.style_src, services, &options.style_src_elements),
        compose_policy(&table.style_src_elem, services, &options.style_src_elem_elements),
        compose_policy(&table.font_src, services, &options.font_src_elements),
        compose_policy(&table.img_src, services, &options.img_src_elements),
        compose_policy(&table.manifest_src, services, &options.manifest_src_elements),
        compose_policy(&table.connect_src, services, &options.connect_src_elements),
        compose_policy(&table.frame_src, services, &options.frame_src_elements),
        compose_policy(&table.frame_ancestors, services, &options.frame_ancestors_elements),
        compose_policy(&table.object_src, services, &options.object_src_elements),
    ];

    policies.join("; ")
}

/// Compute the CSP hash-source token for an inline script body.
///
/// Carriage returns are stripped before hashing: browsers hash the parsed
/// script body, which never contains them, so CRLF and LF line endings must
/// produce the same token.
pub fn csp_sha256(script_content: &str) -> String {
    let clean = script_content.replace('\r', "");
    let digest = Sha256::digest(clean.as_bytes());
    let b64 = base64::engine::general_purpose::STANDARD.encode(digest);
    format!("'sha256-{b64}'")
}
