use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Version information from build script - using option_env! for safety
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default upstream request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;

/// Get version information
pub fn get_version_info() -> String {
    let build_timestamp = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let build_date = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown");
    let rustc_semver = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");
    let cargo_target_triple = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");
    let cargo_opt_level = option_env!("VERGEN_CARGO_OPT_LEVEL").unwrap_or("unknown");

    format!(
        "specgate version {}\n\
         Built: {} ({})\n\
         Rust: {}\n\
         Target: {} (opt-level {})",
        VERSION, build_date, build_timestamp, rustc_semver, cargo_target_triple, cargo_opt_level
    )
}

/// Upstream API the dispatcher proxies GET calls to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: String,
    /// Sent as `X-API-Key` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
    /// Static headers added to every upstream request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            bearer_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            headers: HashMap::new(),
        }
    }
}

impl EndpointConfig {
    /// Blank credentials are treated as not configured.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        non_blank(self.bearer_token.as_deref())
    }

    /// Falls back to the default for values `validate()` would reject.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|t| !t.is_zero())
            .unwrap_or_else(|| std::time::Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// ServerMode represents the tool transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum ServerMode {
    #[serde(rename = "stdio")]
    #[default]
    Stdio,
    #[serde(rename = "http")]
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub mode: ServerMode,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            mode: ServerMode::default(),
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_name() -> String {
    "specgate".to_string()
}
fn default_version() -> String {
    VERSION.to_string()
}
fn default_timeout_seconds() -> f64 {
    DEFAULT_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub append_to_file: bool,
    #[serde(default)]
    pub disable_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: true,
            output_path: None,
            append_to_file: false,
            disable_console: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "compact".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub spec_file: String,
    #[serde(default)]
    pub adjustments_file: Option<String>,
}

impl AppConfig {
    /// Load layered configuration: defaults, config files, then `SPECGATE_*`
    /// environment variables (`SPECGATE_ENDPOINT__API_KEY` -> `endpoint.api_key`).
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .set_default("server.port", default_port())?
            .set_default("server.host", default_host())?
            .set_default("server.mode", "stdio")?
            .set_default("server.name", default_name())?
            .set_default("server.version", VERSION)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .set_default("logging.color", true)?
            .set_default("endpoint.timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("/etc/specgate/config").required(false));

        if let Some(path) = config_file {
            config_builder = config_builder.add_source(File::with_name(path).required(true));
        }

        let config = config_builder
            .add_source(
                config::Environment::with_prefix("SPECGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check the fields that must be usable before any service is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spec_file.trim().is_empty() {
            return Err(ConfigError::Message("spec file is required".to_string()));
        }

        let base_url = reqwest::Url::parse(&self.endpoint.base_url).map_err(|e| {
            ConfigError::Message(format!(
                "endpoint base_url '{}' is not a valid URL: {}",
                self.endpoint.base_url, e
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "endpoint base_url must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        if !(self.endpoint.timeout_seconds.is_finite() && self.endpoint.timeout_seconds > 0.0) {
            return Err(ConfigError::Message(format!(
                "endpoint timeout_seconds must be positive, got {}",
                self.endpoint.timeout_seconds
            )));
        }
        std::time::Duration::try_from_secs_f64(self.endpoint.timeout_seconds).map_err(|e| {
            ConfigError::Message(format!(
                "endpoint timeout_seconds {} is out of range: {}",
                self.endpoint.timeout_seconds, e
            ))
        })?;

        Ok(())
    }
}
