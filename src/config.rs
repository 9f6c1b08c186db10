//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assistant::GenerativeConfig;
use crate::kiosk::{KioskConfig as KioskRuntimeConfig, DEFAULT_MERCHANT_PASSWORD};
use crate::store::StoreConfig;
use crate::websocket::HubConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub kiosk: KioskConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key-value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("homcha").to_string_lossy().to_string())
        .unwrap_or_else(|| "./homcha_data".to_string())
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Shop floor behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct KioskConfig {
    #[serde(default = "default_merchant_password")]
    pub merchant_password: String,

    #[serde(default = "default_payment_delay")]
    pub payment_delay_ms: u64,

    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_ms: u64,

    #[serde(default = "default_queue_prefix")]
    pub queue_prefix: String,

    #[serde(default = "default_restaurant_name")]
    pub restaurant_name: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_merchant_password() -> String {
    DEFAULT_MERCHANT_PASSWORD.to_string()
}

fn default_payment_delay() -> u64 {
    1500
}

fn default_notification_ttl() -> u64 {
    5000
}

fn default_queue_prefix() -> String {
    "A".to_string()
}

fn default_restaurant_name() -> String {
    "บ้านหอมชาพะเยา".to_string()
}

fn default_max_connections() -> usize {
    256
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            merchant_password: default_merchant_password(),
            payment_delay_ms: default_payment_delay(),
            notification_ttl_ms: default_notification_ttl(),
            queue_prefix: default_queue_prefix(),
            restaurant_name: default_restaurant_name(),
            max_connections: default_max_connections(),
        }
    }
}

/// Generative-language API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_url")]
    pub base_url: String,

    #[serde(default = "default_assistant_model")]
    pub model: String,

    /// Usually supplied through `API_KEY` rather than the file
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_assistant_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_assistant_retries")]
    pub max_retries: u32,
}

fn default_assistant_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_assistant_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_assistant_timeout() -> u64 {
    20_000
}

fn default_assistant_retries() -> u32 {
    2
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_assistant_url(),
            model: default_assistant_model(),
            api_key: None,
            request_timeout_ms: default_assistant_timeout(),
            max_retries: default_assistant_retries(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("homcha").join("config.toml")),
            Some(PathBuf::from("/etc/homcha/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store overrides
        if let Some(data_dir) = var("HOMCHA_DATA_DIR") {
            self.store.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = var("HOMCHA_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("HOMCHA_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Kiosk overrides
        if let Some(password) = var("HOMCHA_MERCHANT_PASSWORD") {
            self.kiosk.merchant_password = password;
        }

        // Assistant overrides
        if let Some(url) = var("HOMCHA_ASSISTANT_URL") {
            self.assistant.base_url = url;
        }
        if let Some(model) = var("HOMCHA_ASSISTANT_MODEL") {
            self.assistant.model = model;
        }
        if let Some(key) = var("API_KEY") {
            self.assistant.api_key = Some(key);
        }

        // Logging overrides
        if let Some(level) = var("HOMCHA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HOMCHA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.store.data_dir)
    }

    pub fn kiosk_config(&self) -> KioskRuntimeConfig {
        KioskRuntimeConfig {
            merchant_password: self.kiosk.merchant_password.clone(),
            payment_delay: Duration::from_millis(self.kiosk.payment_delay_ms),
            notification_ttl: Duration::from_millis(self.kiosk.notification_ttl_ms),
            queue_prefix: self.kiosk.queue_prefix.clone(),
            restaurant_name: self.kiosk.restaurant_name.clone(),
            hub: HubConfig {
                max_connections: self.kiosk.max_connections,
                ..HubConfig::default()
            },
        }
    }

    /// Client settings, or `None` when no API key is set
    pub fn assistant_config(&self) -> Option<GenerativeConfig> {
        let api_key = self
            .assistant
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())?;

        Some(GenerativeConfig {
            base_url: self.assistant.base_url.clone(),
            model: self.assistant.model.clone(),
            api_key: api_key.to_string(),
            request_timeout_ms: self.assistant.request_timeout_ms,
            max_retries: self.assistant.max_retries,
        })
    }

    pub fn api_config(&self) -> crate::api::ApiConfig {
        crate::api::ApiConfig {
            host: self.api.host.clone(),
            port: self.api.port,
            cors_origins: self.api.cors_origins.clone(),
            request_timeout_ms: self.api.request_timeout_secs * 1000,
            ..Default::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Homcha Configuration
#
# Environment variables override these settings:
# - HOMCHA_DATA_DIR
# - HOMCHA_API_HOST
# - HOMCHA_API_PORT
# - HOMCHA_MERCHANT_PASSWORD
# - HOMCHA_ASSISTANT_URL
# - HOMCHA_ASSISTANT_MODEL
# - API_KEY (generative-language API key)
# - HOMCHA_LOG_LEVEL
# - HOMCHA_LOG_FORMAT

[store]
# Directory holding the persisted menu and role
data_dir = "~/.local/share/homcha"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[kiosk]
# Staff login password
merchant_password = "907264"

# Simulated QR payment processing time (ms)
payment_delay_ms = 1500

# How long a notification stays visible (ms)
notification_ttl_ms = 5000

# Queue ticket prefix (A001, A002, ...)
queue_prefix = "A"

# Name used in the assistant's prompt
restaurant_name = "บ้านหอมชาพะเยา"

# Maximum concurrent WebSocket screens
max_connections = 256

[assistant]
# Generative-language API base URL
base_url = "https://generativelanguage.googleapis.com"

# Model name
model = "gemini-3-flash-preview"

# API key; prefer the API_KEY environment variable
# api_key = ""

# Per-request timeout (ms)
request_timeout_ms = 20000

# Attempts per question before falling back to an apology
max_retries = 2

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.kiosk.merchant_password, "907264");
        assert_eq!(config.kiosk.payment_delay_ms, 1500);
        assert_eq!(config.kiosk.notification_ttl_ms, 5000);
        assert!(config.assistant_config().is_none());
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.kiosk.queue_prefix, "A");
        assert_eq!(config.assistant.model, "gemini-3-flash-preview");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [kiosk]
            payment_delay_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.kiosk.payment_delay_ms, 10);
        assert_eq!(config.kiosk.restaurant_name, "บ้านหอมชาพะเยา");
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HOMCHA_API_PORT", "9000"),
            ("HOMCHA_MERCHANT_PASSWORD", "1234"),
            ("API_KEY", "secret"),
            ("HOMCHA_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.kiosk.merchant_password, "1234");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.assistant_config().unwrap().api_key, "secret");
    }

    #[test]
    fn test_blank_api_key_disables_assistant() {
        let mut config = Config::default();
        config.assistant.api_key = Some("   ".to_string());
        assert!(config.assistant_config().is_none());
    }

    #[test]
    fn test_runtime_conversion() {
        let mut config = Config::default();
        config.kiosk.payment_delay_ms = 250;
        config.kiosk.max_connections = 8;

        let kiosk = config.kiosk_config();
        assert_eq!(kiosk.payment_delay, Duration::from_millis(250));
        assert_eq!(kiosk.hub.max_connections, 8);
        assert_eq!(config.api_config().request_timeout_ms, 30_000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/homcha.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
