use std::{env, fmt, time::Duration};

use crate::error::{Error, Result};

/// Provider URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.serialized.io";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ACCESS_KEY_ENV: &str = "SERIALIZED_ACCESS_KEY";
pub const SECRET_ACCESS_KEY_ENV: &str = "SERIALIZED_SECRET_ACCESS_KEY";
pub const BASE_URL_ENV: &str = "SERIALIZED_BASE_URL";

/// Connection settings for a [`Client`](crate::Client).
///
/// ```rust,ignore
/// let config = ClientConfig::new("access-key", "secret-key")
///     .with_base_url("http://localhost:8080")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_key: String,
    pub secret_access_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config for the default provider URL and timeout.
    pub fn new(access_key: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: access_key.into(),
            secret_access_key: secret_access_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads credentials and an optional base URL from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };

        let mut config = ClientConfig::new(
            required(ACCESS_KEY_ENV)?,
            required(SECRET_ACCESS_KEY_ENV)?,
        );
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.is_empty()) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Points the client at another provider URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &self.access_key)
            .field("secret_access_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
