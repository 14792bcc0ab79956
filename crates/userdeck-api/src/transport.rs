// Shared transport configuration for building reqwest::Client instances.

use std::time::Duration;

const USER_AGENT: &str = concat!("userdeck/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout applied to every call.
    pub timeout: Duration,
    /// Accept self-signed or otherwise invalid certificates.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| crate::error::Error::Client(e.to_string()))
    }
}
