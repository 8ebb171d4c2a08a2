//! Script injection into the served HTML document.
//!
//! A deliberately narrow text-splice operation: the document is build-time
//! controlled, so splice points are located with case-insensitive patterns
//! rather than a DOM parser. Everything outside the insertion window is
//! preserved byte for byte, and fragments are inserted verbatim so that the
//! CSP hashes computed over their bodies stay valid.

use std::sync::LazyLock;

use regex::Regex;

/// Historical inline env-injection script shipped inside older builds.
/// Removed on sight so the runtime-injected env script is the only source of
/// truth for `window.process`.
static LEGACY_ENV_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script.+?window\.process = \{ env: \{ VITE_ENVIRONMENT:.+?/script>")
        .expect("legacy env script pattern")
});

static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head>").expect("head close pattern"));

static SCRIPT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script").expect("script open pattern"));

/// Insert script fragments into the document head.
///
/// `env_script` and every present entry of `extra_fragments` must already be
/// complete `<script ...>...</script>` strings. Fragments are placed, env
/// script first, before the first existing `<script` tag, or immediately
/// before `</head>` if no script exists. A document without a closing
/// `</head>` is returned unchanged apart from legacy-marker removal.
pub fn inject_scripts(html: &str, env_script: &str, extra_fragments: &[Option<String>]) -> String {
    let html = remove_legacy_env_script(html);

    let mut fragments = vec![env_script];
    fragments.extend(
        extra_fragments
            .iter()
            .flatten()
            .filter(|f| !f.is_empty())
            .map(String::as_str),
    );

    let Some(head_close) = HEAD_CLOSE.find(&html) else {
        tracing::warn!("cannot insert head scripts: no closing </head> tag in document");
        return html;
    };

    // The fragments go before any pre-existing script so they execute first.
    // When they do displace a script, keep a newline between the last fragment
    // and the displaced tag.
    let (index, before_script) = match SCRIPT_OPEN.find(&html) {
        Some(script) if script.start() < head_close.start() => (script.start(), true),
        _ => (head_close.start(), false),
    };

    let mut joined = fragments.join("\n");
    if before_script {
        joined.push('\n');
    }

    format!("{}{}{}", &html[..index], joined, &html[index..])
}

fn remove_legacy_env_script(html: &str) -> String {
    let updated = LEGACY_ENV_SCRIPT.replace(html, "");
    if updated.len() != html.len() {
        tracing::warn!(
            "legacy client env injection site removed - please delete the script containing \
             `window.process = {{ env: {{...}} }}` from your index.html"
        );
    }
    updated.into_owned()
}
