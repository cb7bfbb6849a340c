//! CAS provider configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROVIDER_NAME: &str = "cas";
pub const DEFAULT_LOGIN_URL: &str = "https://secure.its.yale.edu/cas/login";
pub const DEFAULT_VALIDATE_URL: &str = "https://secure.its.yale.edu/cas/serviceValidate";

/// Configuration of a single CAS server and the service that trusts it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CasConfig {
    pub provider_name: String,
    /// Callback URL CAS redirects back to. Must match what CAS expects for
    /// the service, byte for byte.
    pub service_url: String,
    pub login_url: String,
    pub validate_url: String,
    /// Timeout of the fallback HTTP client
    pub http_timeout_seconds: u64,
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            service_url: String::new(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            validate_url: DEFAULT_VALIDATE_URL.to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl CasConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn with_validate_url(mut self, url: impl Into<String>) -> Self {
        self.validate_url = url.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }
}
