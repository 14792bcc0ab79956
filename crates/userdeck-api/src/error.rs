use thiserror::Error;

/// Top-level error type for the `userdeck-api` crate.
///
/// Covers transport failures, non-2xx responses and undecodable bodies.
/// `userdeck-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Building the underlying HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    // ── Server ──────────────────────────────────────────────────────
    /// The server answered with a non-2xx status.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
