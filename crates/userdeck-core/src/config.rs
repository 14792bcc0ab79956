// ── Runtime API configuration ──
//
// Describes *where* the users API lives and how to talk to it. Never
// touches disk: the CLI/TUI builds an `ApiConfig` and hands it in.

use std::time::Duration;

use url::Url;
use userdeck_api::TransportConfig;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one users API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root (e.g. `http://localhost:3333`).
    pub base_url: Url,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Users per page in list views.
    pub page_size: u32,
    /// Age after which cached reads are refetched even without an
    /// invalidation. `None` keeps them until invalidated.
    pub stale_after: Option<Duration>,
    /// Accept invalid TLS certificates (self-signed dev servers).
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            stale_after: None,
            accept_invalid_certs: false,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}
