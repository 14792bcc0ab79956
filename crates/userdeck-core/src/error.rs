// ── Core error types ──
//
// User-facing errors from userdeck-core. Consumers never see raw transport
// or JSON failures; the `From<userdeck_api::Error>` impl translates them
// into domain variants, and the service wraps each with the operation that
// failed.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// Rejected by the server (400/422). Never raised client-side.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    /// Context wrapper naming the operation that failed.
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        source: Box<CoreError>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap this error with the name of the operation that produced it.
    pub fn in_operation(self, operation: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any `Operation` wrappers.
    pub fn root(&self) -> &CoreError {
        let mut current = self;
        while let Self::Operation { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound { .. })
    }

    /// HTTP status behind this error, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<userdeck_api::Error> for CoreError {
    fn from(err: userdeck_api::Error) -> Self {
        match err {
            userdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            userdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            userdeck_api::Error::Client(message) => CoreError::Config { message },
            userdeck_api::Error::Status {
                status: 404,
                message,
            } => CoreError::NotFound { message },
            userdeck_api::Error::Status {
                status: 400 | 422,
                message,
            } => CoreError::ValidationFailed { message },
            userdeck_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            userdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_maps_to_not_found() {
        let err = CoreError::from(userdeck_api::Error::Status {
            status: 404,
            message: "User not found".into(),
        });
        assert!(matches!(err, CoreError::NotFound { ref message } if message == "User not found"));
    }

    #[test]
    fn validation_statuses_map_to_validation_failed() {
        for status in [400, 422] {
            let err = CoreError::from(userdeck_api::Error::Status {
                status,
                message: "email must be an email".into(),
            });
            assert!(matches!(err, CoreError::ValidationFailed { .. }));
        }
    }

    #[test]
    fn server_error_keeps_status() {
        let err = CoreError::from(userdeck_api::Error::Status {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn operation_wrapper_is_transparent_to_helpers() {
        let err = CoreError::NotFound {
            message: "User not found".into(),
        }
        .in_operation("failed to delete user");

        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err.root(), CoreError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "failed to delete user: Not found: User not found"
        );
    }

    #[test]
    fn deserialization_is_internal() {
        let err = CoreError::from(userdeck_api::Error::Deserialization {
            message: "missing field `id`".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
