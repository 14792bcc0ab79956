//! CLI configuration: a thin wrapper around the shared `userdeck_config` types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--url, --timeout, --insecure).

use std::time::Duration;

use clap::ValueEnum;

use userdeck_core::ApiConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use userdeck_config::{
    Config, ConfigError, Defaults, Server, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill unset output/color flags from the `[defaults]` table.
///
/// Unknown names in the file fall back to table / auto.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = Some(
            OutputFormat::from_str(&defaults.output, true).unwrap_or(OutputFormat::Table),
        );
    }
    if global.color.is_none() {
        global.color =
            Some(ColorMode::from_str(&defaults.color, true).unwrap_or(ColorMode::Auto));
    }
}

/// Comma-separated server names for error help text.
pub fn available_servers(config: &Config) -> String {
    if config.servers.is_empty() {
        "(none)".into()
    } else {
        config.servers.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build the `ApiConfig` for this invocation.
///
/// Precedence: flags / env > server entry > `[defaults]`.
pub fn resolve_api_config(global: &GlobalOpts, config: &Config) -> Result<ApiConfig, CliError> {
    let mut api = userdeck_config::resolve_api_config(
        config,
        global.server.as_deref(),
        global.url.as_deref(),
    )
    .map_err(|err| match err {
        ConfigError::UnknownServer { name } => CliError::ServerNotFound {
            name,
            available: available_servers(config),
        },
        other => other.into(),
    })?;

    if let Some(secs) = global.timeout {
        api.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        api.accept_invalid_certs = true;
    }
    Ok(api)
}
