//! Configuration management for catalog-sync
//!
//! Configuration can come from a YAML file (with `${VAR}` expansion) or
//! purely from environment variables. Environment variables also fill any
//! store setting a YAML file leaves empty. The four store settings are
//! required; [`ShopConfig::resolve`] reports every missing one at once.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the store domain
pub const ENV_STORE_DOMAIN: &str = "SHOPIFY_STORE_DOMAIN";
/// Environment variable holding the Admin API access token
pub const ENV_ACCESS_TOKEN: &str = "SHOPIFY_ACCESS_TOKEN";
/// Environment variable holding the Admin API version tag
pub const ENV_API_VERSION: &str = "SHOPIFY_API_VERSION";
/// Environment variable holding the default inventory location
pub const ENV_LOCATION_ID: &str = "SHOPIFY_LOCATION_ID";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "CATALOG_SYNC_LOG_LEVEL";
/// Environment variable overriding the per-call HTTP timeout
pub const ENV_REQUEST_TIMEOUT: &str = "CATALOG_SYNC_REQUEST_TIMEOUT_SECS";

const LOCATION_GID_PREFIX: &str = "gid://shopify/Location/";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Store connection settings
    #[serde(default)]
    pub shop: ShopConfig,

    /// Retry policy for throttled calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Proactive pacing policy
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Fill unset store settings and overrides from the environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        fill_from_env(&mut self.shop.store_domain, ENV_STORE_DOMAIN);
        fill_from_env(&mut self.shop.access_token, ENV_ACCESS_TOKEN);
        fill_from_env(&mut self.shop.api_version, ENV_API_VERSION);
        fill_from_env(&mut self.shop.location_id, ENV_LOCATION_ID);

        if let Ok(timeout) = std::env::var(ENV_REQUEST_TIMEOUT) {
            self.shop.request_timeout_secs = timeout.parse().map_err(|_| {
                ConfigError::InvalidValue(format!("Invalid request timeout: {}", timeout))
            })?;
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        Ok(())
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if is_unset(slot) {
        if let Ok(value) = std::env::var(var) {
            *slot = Some(value);
        }
    }
}

/// Absent, blank, or still holding an unexpanded `${VAR}` placeholder
fn is_unset(slot: &Option<String>) -> bool {
    slot.as_deref()
        .map_or(true, |v| v.trim().is_empty() || v.contains("${"))
}

/// Store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopConfig {
    /// Store domain, e.g. `my-store.myshopify.com`
    pub store_domain: Option<String>,

    /// Admin API access token
    pub access_token: Option<String>,

    /// Admin API version, e.g. `2024-10`
    pub api_version: Option<String>,

    /// Default location for inventory quantities
    pub location_id: Option<String>,

    /// Hard timeout for a single HTTP call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            store_domain: None,
            access_token: None,
            api_version: None,
            location_id: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

impl ShopConfig {
    /// Check that every required setting is present
    ///
    /// Blank values count as missing. The error names the environment
    /// variables so the operator knows what to set.
    pub fn resolve(&self) -> Result<ShopSettings, ConfigError> {
        let required = [
            (&self.store_domain, ENV_STORE_DOMAIN),
            (&self.access_token, ENV_ACCESS_TOKEN),
            (&self.api_version, ENV_API_VERSION),
            (&self.location_id, ENV_LOCATION_ID),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(value, _)| is_unset(value))
            .map(|(_, name)| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings(missing));
        }

        let value = |slot: &Option<String>| slot.as_deref().unwrap_or_default().trim().to_string();

        Ok(ShopSettings {
            store_domain: value(&self.store_domain),
            access_token: value(&self.access_token),
            api_version: value(&self.api_version),
            location_id: location_gid(&value(&self.location_id)),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

/// Validated store settings
#[derive(Debug, Clone, PartialEq)]
pub struct ShopSettings {
    pub store_domain: String,
    pub access_token: String,
    pub api_version: String,
    /// Location as a global id
    pub location_id: String,
    pub request_timeout: Duration,
}

impl ShopSettings {
    /// GraphQL Admin API endpoint for this store
    ///
    /// A store domain that already carries a scheme is used as the base URL.
    pub fn graphql_endpoint(&self) -> String {
        let domain = self.store_domain.trim_end_matches('/');
        let base = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        format!("{}/admin/api/{}/graphql.json", base, self.api_version)
    }
}

/// Expand a bare numeric location id into a global id
fn location_gid(location: &str) -> String {
    if !location.is_empty() && location.chars().all(|c| c.is_ascii_digit()) {
        format!("{}{}", LOCATION_GID_PREFIX, location)
    } else {
        location.to_string()
    }
}

/// Retry configuration for throttled calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff interval in milliseconds, doubled on every retry
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_backoff() -> u64 {
    1000
}

/// Proactive pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrottleConfig {
    /// Pause when the available credits drop below this value
    #[serde(default = "default_low_credit_threshold")]
    pub low_credit_threshold: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            low_credit_threshold: default_low_credit_threshold(),
        }
    }
}

fn default_low_credit_threshold() -> f64 {
    50.0
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Required settings are absent
    #[error("Missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<String>),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
