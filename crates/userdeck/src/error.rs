//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use userdeck_config::ConfigError;
use userdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the API at {url}")]
    #[diagnostic(
        code(userdeck::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(userdeck::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(userdeck::not_found),
        help("Run: userdeck {list_command}")
    )]
    NotFound {
        message: String,
        list_command: String,
    },

    /// The server refused the request (400/422).
    #[error("{message}")]
    #[diagnostic(code(userdeck::rejected))]
    Rejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(userdeck::api_error))]
    ApiError { status: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(userdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Server '{name}' not found in configuration")]
    #[diagnostic(
        code(userdeck::server_not_found),
        help(
            "Available servers: {available}\n\
             Create one with: userdeck config init"
        )
    )]
    ServerNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(userdeck::no_config),
        help(
            "Create a config with: userdeck config init\n\
             Or pass --url / set USERDECK_API_URL.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(userdeck::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(userdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(userdeck::render))]
    Render(String),

    #[error("{0}")]
    #[diagnostic(code(userdeck::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ServerNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoServer => Self::NoConfig {
                path: userdeck_config::config_path().display().to_string(),
            },
            ConfigError::UnknownServer { name } => Self::ServerNotFound {
                name,
                available: "(see `userdeck config servers`)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

// Cached reads hand errors out behind an `Arc`, so the mapping works on a
// reference. The full message keeps any operation context
// ("failed to delete user 7: Not found: User not found").
impl From<&CoreError> for CliError {
    fn from(err: &CoreError) -> Self {
        match err.root() {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound { .. } => Self::NotFound {
                message: err.to_string(),
                list_command: "users list".into(),
            },
            CoreError::ValidationFailed { .. } => Self::Rejected {
                message: err.to_string(),
            },
            CoreError::Api { status, .. } => Self::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message: err.to_string(),
            },
            CoreError::Config { message } => Self::Validation {
                field: "url".into(),
                reason: message.clone(),
            },
            CoreError::Operation { .. } | CoreError::Internal(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::from(&err)
    }
}

impl From<std::sync::Arc<CoreError>> for CliError {
    fn from(err: std::sync::Arc<CoreError>) -> Self {
        Self::from(err.as_ref())
    }
}
