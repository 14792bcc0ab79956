//! Shared configuration for the userdeck CLI and TUI.
//!
//! TOML server entries layered with environment variables, and translation
//! to `userdeck_core::ApiConfig`. Both binaries depend on this crate; the
//! CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use userdeck_core::ApiConfig;

/// Environment variable that points every tool at a server URL directly.
pub const API_URL_ENV: &str = "USERDECK_API_URL";

/// Prefix of environment overrides (`USERDECK_DEFAULTS__TIMEOUT=5`).
pub const ENV_PREFIX: &str = "USERDECK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("server '{name}' is not configured")]
    UnknownServer { name: String },

    #[error("no server configured (set {API_URL_ENV} or run `userdeck config init`)")]
    NoServer,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Server used when none is named.
    pub default_server: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API servers.
    #[serde(default)]
    pub servers: BTreeMap<String, Server>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: Some("local".into()),
            defaults: Defaults::default(),
            servers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seconds before cached reads are refetched; absent means never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_after: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
            stale_after: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    10
}

/// A named API server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Server {
    /// API root URL (e.g., "http://localhost:3333").
    pub url: String,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            insecure: None,
            timeout: None,
            page_size: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "userdeck", "userdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("userdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `USERDECK_*` variables.
///
/// Nested keys use a double underscore: `USERDECK_DEFAULTS__PAGE_SIZE=25`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["api_url"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

impl Config {
    /// Look up `name`, or the default server when `None`.
    pub fn server(&self, name: Option<&str>) -> Result<(&str, &Server), ConfigError> {
        let name = name
            .or(self.default_server.as_deref())
            .ok_or(ConfigError::NoServer)?;
        self.servers
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| {
                if self.servers.is_empty() {
                    ConfigError::NoServer
                } else {
                    ConfigError::UnknownServer { name: name.into() }
                }
            })
    }
}

/// Translate a server entry plus global defaults into an `ApiConfig`.
pub fn server_to_api_config(server: &Server, defaults: &Defaults) -> Result<ApiConfig, ConfigError> {
    let base_url = parse_url(&server.url)?;
    let mut config = ApiConfig::new(base_url);
    config.timeout = Duration::from_secs(server.timeout.unwrap_or(defaults.timeout));
    config.page_size = server.page_size.unwrap_or(defaults.page_size).max(1);
    config.accept_invalid_certs = server.insecure.unwrap_or(defaults.insecure);
    config.stale_after = defaults.stale_after.map(Duration::from_secs);
    Ok(config)
}

/// Resolve the effective `ApiConfig`.
///
/// An explicit `url_override` (flag or `USERDECK_API_URL`) wins and needs
/// no server entry; it still picks up global defaults.
pub fn resolve_api_config(
    cfg: &Config,
    server_name: Option<&str>,
    url_override: Option<&str>,
) -> Result<ApiConfig, ConfigError> {
    if let Some(url) = url_override {
        return server_to_api_config(&Server::new(url), &cfg.defaults);
    }
    let (_, server) = cfg.server(server_name)?;
    server_to_api_config(server, &cfg.defaults)
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}
