//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::clock::DAY_MS;
use crate::dashboard::DashboardConfig;
use crate::session::AuthConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("ticketapp").to_string_lossy().to_string())
        .unwrap_or_else(|| "./ticketapp_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// File backing the per-tab session store
    pub fn session_file(&self) -> PathBuf {
        self.data_path().join("session.json")
    }

    /// File backing the durable local store
    pub fn local_file(&self) -> PathBuf {
        self.data_path().join("local.json")
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Session and auth flow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,

    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,

    #[serde(default = "default_signup_delay")]
    pub signup_delay_ms: u64,
}

fn default_ttl_days() -> u32 {
    7
}

fn default_login_delay() -> u64 {
    1000
}

fn default_signup_delay() -> u64 {
    1500
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_ttl_days(),
            login_delay_ms: default_login_delay(),
            signup_delay_ms: default_signup_delay(),
        }
    }
}

impl SessionConfig {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            login_delay: Duration::from_millis(self.login_delay_ms),
            signup_delay: Duration::from_millis(self.signup_delay_ms),
            session_ttl_ms: self.ttl_days as i64 * DAY_MS,
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_save_toast")]
    pub save_toast_ms: u64,

    #[serde(default = "default_delete_toast")]
    pub delete_toast_ms: u64,
}

fn default_save_toast() -> u64 {
    2500
}

fn default_delete_toast() -> u64 {
    2000
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            save_toast_ms: default_save_toast(),
            delete_toast_ms: default_delete_toast(),
        }
    }
}

impl DashboardSettings {
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            save_toast_ms: self.save_toast_ms,
            delete_toast_ms: self.delete_toast_ms,
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
    "warn".to_string()
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

        Self::from_toml_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
            dirs::config_dir().map(|p| p.join("ticketapp").join("config.toml")),
            Some(PathBuf::from("./ticketapp.toml")),
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

    /// Apply overrides from a `TICKETAPP_*` variable lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = lookup("TICKETAPP_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Session overrides
        if let Some(days) = lookup("TICKETAPP_SESSION_TTL_DAYS").and_then(|v| v.parse().ok()) {
            self.session.ttl_days = days;
        }
        if let Some(ms) = lookup("TICKETAPP_LOGIN_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.session.login_delay_ms = ms;
        }
        if let Some(ms) = lookup("TICKETAPP_SIGNUP_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.session.signup_delay_ms = ms;
        }

        // Logging overrides
        if let Some(level) = lookup("TICKETAPP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TICKETAPP_LOG_FORMAT") {
            self.logging.format = format;
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
    r#"# TicketApp Configuration
#
# Environment variables override these settings:
# - TICKETAPP_DATA_DIR
# - TICKETAPP_SESSION_TTL_DAYS
# - TICKETAPP_LOGIN_DELAY_MS
# - TICKETAPP_SIGNUP_DELAY_MS
# - TICKETAPP_LOG_LEVEL
# - TICKETAPP_LOG_FORMAT

[storage]
# Directory holding session.json and local.json
data_dir = "~/.local/share/ticketapp"

[session]
# Lifetime of a login session (days)
ttl_days = 7

# Simulated latency of a login attempt (ms)
login_delay_ms = 1000

# Simulated latency of a signup (ms)
signup_delay_ms = 1500

[dashboard]
# How long the "created"/"updated" toast stays visible (ms)
save_toast_ms = 2500

# How long the "deleted" toast stays visible (ms)
delete_toast_ms = 2000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses() {
        let config = Config::from_toml_str(&generate_default_config()).unwrap();
        assert_eq!(config.session.ttl_days, 7);
        assert_eq!(config.session.login_delay_ms, 1000);
        assert_eq!(config.dashboard.save_toast_ms, 2500);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_data_dir_expands_home() {
        let config = Config::from_toml_str(&generate_default_config()).unwrap();

        if let Some(home) = dirs::home_dir() {
            assert!(!config.storage.local_file().starts_with("~"));
            assert_eq!(
                config.storage.session_file(),
                home.join(".local/share/ticketapp").join("session.json")
            );
            assert_eq!(expand_home("~"), home);
        }

        assert_eq!(expand_home("/tmp/tickets"), PathBuf::from("/tmp/tickets"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml_str("[session]\nttl_days = 1\n").unwrap();
        assert_eq!(config.session.ttl_days, 1);
        assert_eq!(config.session.signup_delay_ms, 1500);
        assert_eq!(config.dashboard.delete_toast_ms, 2000);
        assert_eq!(config.logging.level, "warn");

        let auth = config.session.auth_config();
        assert_eq!(auth.session_ttl_ms, DAY_MS);
        assert_eq!(auth.login_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TICKETAPP_DATA_DIR", "/tmp/tickets"),
            ("TICKETAPP_LOGIN_DELAY_MS", "0"),
            ("TICKETAPP_SESSION_TTL_DAYS", "not a number"),
            ("TICKETAPP_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/tickets");
        assert_eq!(config.storage.local_file(), PathBuf::from("/tmp/tickets/local.json"));
        assert_eq!(config.session.login_delay_ms, 0);
        assert_eq!(config.session.ttl_days, 7);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[session\nttl_days = ").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }
}
