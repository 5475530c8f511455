//! Store connection configuration
//!
//! Endpoint, credentials, organization and bucket are always supplied from
//! outside, either through the builder or the environment. Nothing here has
//! a baked-in default for them.

use std::fmt;
use std::time::Duration;

use crate::{StoreError, StoreResult};

/// Environment variable holding the store URL
pub const ENV_URL: &str = "GROWSENSE_INFLUX_URL";
/// Environment variable holding the API token
pub const ENV_TOKEN: &str = "GROWSENSE_INFLUX_TOKEN";
/// Environment variable holding the organization
pub const ENV_ORG: &str = "GROWSENSE_INFLUX_ORG";
/// Environment variable holding the bucket
pub const ENV_BUCKET: &str = "GROWSENSE_INFLUX_BUCKET";
/// Optional environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "GROWSENSE_INFLUX_TIMEOUT_SECS";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authentication methods
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// InfluxDB API token (`Authorization: Token ...`)
    Token(String),
    /// Basic authentication (1.x compatibility endpoints)
    Basic { username: String, password: String },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::None => f.write_str("None"),
            AuthMethod::Token(_) => f.write_str("Token(<redacted>)"),
            AuthMethod::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Connection parameters for a time-series store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store
    pub url: String,
    /// Organization the bucket belongs to
    pub org: String,
    /// Bucket (source) queried
    pub bucket: String,
    /// Authentication method
    pub auth: AuthMethod,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl StoreConfig {
    /// Create a configuration without credentials
    pub fn new(url: impl Into<String>, org: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            org: org.into(),
            bucket: bucket.into(),
            auth: AuthMethod::None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("GrowSense/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Read the configuration from `GROWSENSE_INFLUX_*` variables
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`
    ///
    /// URL, token, org and bucket are required; the timeout is optional.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StoreError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(required(ENV_URL)?, required(ENV_ORG)?, required(ENV_BUCKET)?)
            .token(required(ENV_TOKEN)?);

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Config(format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
            config = config.timeout_secs(secs);
        }

        Ok(config)
    }

    /// Set token authentication
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Token(token.into());
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> StoreResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(StoreError::Config("URL must start with http:// or https://".into()));
        }
        if self.org.is_empty() {
            return Err(StoreError::Config("organization is empty".into()));
        }
        if self.bucket.is_empty() {
            return Err(StoreError::Config("bucket is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(StoreError::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        (ENV_URL, "https://influx.example.com/"),
        (ENV_TOKEN, "secret-token"),
        (ENV_ORG, "home"),
        (ENV_BUCKET, "grow-room"),
    ];

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("https://influx.example.com", "home", "grow-room")
            .token("t")
            .timeout_secs(60);

        assert_eq!(config.url, "https://influx.example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.auth, AuthMethod::Token("t".into()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_environment() {
        let config = StoreConfig::from_lookup(env(FULL)).unwrap();
        assert_eq!(config.url, "https://influx.example.com");
        assert_eq!(config.org, "home");
        assert_eq!(config.bucket, "grow-room");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn missing_variable_is_named() {
        let partial: Vec<(&str, &str)> = FULL.iter().copied().filter(|(k, _)| *k != ENV_TOKEN).collect();
        let err = StoreConfig::from_lookup(env(&partial)).unwrap_err();
        assert!(err.to_string().contains(ENV_TOKEN));
    }

    #[test]
    fn timeout_override() {
        let mut pairs = FULL.to_vec();
        pairs.push((ENV_TIMEOUT_SECS, "5"));
        assert_eq!(StoreConfig::from_lookup(env(&pairs)).unwrap().timeout, Duration::from_secs(5));

        pairs.pop();
        pairs.push((ENV_TIMEOUT_SECS, "soon"));
        assert!(StoreConfig::from_lookup(env(&pairs)).is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(StoreConfig::new("influx.local", "o", "b").validate().is_err());
        assert!(StoreConfig::new("http://influx.local", "o", "").validate().is_err());
        assert!(StoreConfig::new("http://influx.local", "o", "b").validate().is_ok());
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = StoreConfig::new("https://x", "o", "b").token("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));

        let config = config.basic_auth("grower", "hunter2");
        let shown = format!("{:?}", config);
        assert!(shown.contains("grower"));
        assert!(!shown.contains("hunter2"));
    }
}
