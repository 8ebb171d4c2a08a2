//! Server settings, loaded once at startup from a JSON file.

use std::path::PathBuf;

use serde::Deserialize;

use crate::csp::CspOptions;
use crate::telemetry::TelemetryConfig;

pub const DEFAULT_ALLOWED_METHODS: &[&str] = &["GET", "PUT", "PATCH", "POST", "DELETE"];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("corsOptions.allowedOrigins cannot be empty; use \"*\" to allow all cross-origin requests")]
    EmptyAllowedOrigins,

    #[error("targetServerUrl cannot be empty")]
    EmptyTargetServerUrl,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Runtime environment name; selects the `client.env.<nodeEnv>` and
    /// `config.<nodeEnv>.json` files to load.
    pub node_env: String,

    /// Path prefix the front-end app runs under. The API proxy is mounted at
    /// `<appPrefix>/api`.
    pub app_prefix: String,

    /// Base URL of the backend API the proxy forwards to.
    pub target_server_url: String,

    /// Root of the built client assets.
    pub client_build_path: PathBuf,

    pub index_options: IndexOptions,
    pub csp_options: CspOptions,
    pub cors_options: CorsOptions,
    pub telemetry: Option<TelemetryConfig>,

    /// HTTP methods the server accepts; everything else gets a 405.
    pub allowed_methods: Vec<String>,

    /// Inject `config.<nodeEnv>.json` as a window global.
    pub use_json_configuration: bool,

    /// Request paths rejected outright (API endpoints that exist on the
    /// backend but must not be reachable through this server).
    pub blacklist_paths: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            node_env: "development".to_string(),
            app_prefix: String::new(),
            target_server_url: String::new(),
            client_build_path: PathBuf::from("dist"),
            index_options: IndexOptions::default(),
            csp_options: CspOptions::default(),
            cors_options: CorsOptions::default(),
            telemetry: None,
            allowed_methods: DEFAULT_ALLOWED_METHODS.iter().map(|m| m.to_string()).collect(),
            use_json_configuration: false,
            blacklist_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexOptions {
    /// Alternative name for the index document; a full path or a file name
    /// under the build path. Defaults to `index.html`.
    pub filename: Option<String>,

    /// Window global to inject runtime env settings under.
    pub global_client_env_variable_name: String,

    /// Window global to inject the JSON configuration under.
    pub global_json_config_variable_name: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            filename: None,
            global_client_env_variable_name: "process.env".to_string(),
            global_json_config_variable_name: "__APP_CONFIG__".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorsOptions {
    /// Exhaustive list of allowed origins; `"*"` allows every origin.
    pub allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn load_from_file(path: PathBuf) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse { path, source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cors_options.allowed_origins.is_empty() {
            return Err(SettingsError::EmptyAllowedOrigins);
        }
        if self.target_server_url.is_empty() {
            return Err(SettingsError::EmptyTargetServerUrl);
        }
        Ok(())
    }

    pub fn method_allowed(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }

    /// Join a path onto the app prefix, collapsing duplicate slashes.
    pub fn app_path(&self, path: &str) -> String {
        let joined = format!("/{}/{}", self.app_prefix, path);
        let mut result = String::with_capacity(joined.len());
        for c in joined.chars() {
            if c == '/' && result.ends_with('/') {
                continue;
            }
            result.push(c);
        }
        if result.len() > 1 && result.ends_with('/') {
            result.pop();
        }
        result
    }
}
