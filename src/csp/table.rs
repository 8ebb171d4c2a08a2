//! The static CSP directive table.
//!
//! One list per directive. Each list starts with the directive name itself,
//! followed by its always-included source tokens and the tokens gated on a
//! third-party [`Service`]. Built once at startup and never mutated.

use super::{PolicyElement, Service};

/// Immutable registry of the base policy for every emitted directive.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    pub default_src: Vec<PolicyElement>,
    pub script_src_elem: Vec<PolicyElement>,
    pub script_src: Vec<PolicyElement>,
    pub style_src: Vec<PolicyElement>,
    pub style_src_elem: Vec<PolicyElement>,
    pub font_src: Vec<PolicyElement>,
    pub img_src: Vec<PolicyElement>,
    pub manifest_src: Vec<PolicyElement>,
    pub connect_src: Vec<PolicyElement>,
    pub frame_src: Vec<PolicyElement>,
    pub frame_ancestors: Vec<PolicyElement>,
    pub object_src: Vec<PolicyElement>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        use PolicyElement as E;
        use Service::*;

        Self {
            default_src: vec![E::bare("default-src"), E::bare("'self'")],

            script_src_elem: vec![
                E::bare("script-src-elem"),
                E::bare("'self'"),
                E::gated("https://translate.google.com", GoogleTranslate),
                E::gated("https://translate.googleapis.com", GoogleTranslate),
                E::gated("https://translate-pa.googleapis.com", GoogleTranslate),
                E::gated("https://www.googletagmanager.com", GoogleAnalytics),
                E::gated("https://static.hotjar.com", Hotjar),
                E::gated("https://script.hotjar.com", Hotjar),
                E::gated("https://js-agent.newrelic.com", NewRelic),
                E::gated("https://bam.nr-data.net", NewRelic),
            ],

            script_src: vec![
                E::bare("script-src"),
                E::bare("'self'"),
                E::gated("http://*.hotjar.com:*", Hotjar),
                E::gated("https://*.hotjar.com:*", Hotjar),
                E::gated("http://*.hotjar.io", Hotjar),
                E::gated("https://*.hotjar.io", Hotjar),
                E::gated("wss://*.hotjar.com", Hotjar),
                E::gated("https://stats.g.doubleclick.net", GoogleAnalytics),
                E::gated("https://*.fullstory.com", FullStory),
                E::gated("https://fonts.google.com", GoogleFonts),
                E::gated("https://www.googletagmanager.com", GoogleAnalytics),
                E::gated("https://*.google-analytics.com", GoogleAnalytics),
                E::gated("https://bam.nr-data.net", NewRelic),
                E::gated("https://js-agent.newrelic.com", NewRelic),
            ],

            style_src: vec![E::bare("style-src"), E::bare("'self'")],

            style_src_elem: vec![
                E::bare("style-src-elem"),
                E::bare("'self'"),
                E::bare("'unsafe-inline'"),
                E::bare("https://cloud.typography.com"),
                E::gated("https://fonts.googleapis.com", GoogleFonts),
                E::gated("https://translate.googleapis.com", GoogleTranslate),
            ],

            font_src: vec![
                E::bare("font-src"),
                E::bare("'self'"),
                E::gated("https://fonts.gstatic.com", GoogleFonts),
            ],

            img_src: vec![
                E::bare("img-src"),
                E::bare("'self'"),
                E::bare("data:"),
                E::gated("https://www.google-analytics.com", GoogleAnalytics),
                E::gated("https://translate.googleapis.com", GoogleTranslate),
                E::gated("https://translate.google.com", GoogleTranslate),
            ],

            manifest_src: vec![E::bare("manifest-src"), E::bare("'self'"), E::bare("data:")],

            connect_src: vec![
                E::bare("connect-src"),
                E::bare("'self'"),
                E::gated("https://translate.googleapis.com", GoogleTranslate),
                E::gated("https://translation.googleapis.com", GoogleTranslate),
                E::gated("https://www.google-analytics.com", GoogleAnalytics),
                E::gated("https://bam.nr-data.net", NewRelic),
                E::gated("https://*.hotjar.com", Hotjar),
                E::gated("https://*.hotjar.io", Hotjar),
                E::gated("wss://*.hotjar.com", Hotjar),
                E::gated("https://api.powerbi.com", PowerBi),
            ],

            frame_src: vec![
                E::bare("frame-src"),
                E::bare("'self'"),
                E::gated("https://vars.hotjar.com", Hotjar),
            ],

            frame_ancestors: vec![E::bare("frame-ancestors"), E::bare("'none'")],

            object_src: vec![E::bare("object-src"), E::bare("'none'")],
        }
    }
}
