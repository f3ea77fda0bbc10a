mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::SignalError;
use defaults::*;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// How to reach the signal-cli-rest-api service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Host and port of the service, without scheme (e.g. `127.0.0.1:8080`).
    #[serde(default = "default_service")]
    pub service: String,
    /// The bot's own account number.
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub connection_mode: ConnectionMode,
    #[serde(default = "default_true")]
    pub download_attachments: bool,
    /// Seconds between health probes while waiting for the service.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            phone_number: String::new(),
            connection_mode: ConnectionMode::default(),
            download_attachments: true,
            retry_interval_secs: default_retry_interval(),
        }
    }
}

/// Scheme selection for REST and WebSocket connections.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Try HTTPS first, fall back to HTTP.
    #[default]
    Auto,
    Https,
    Http,
}

/// Persistent key-value storage backend.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StorageConfig {
    #[default]
    InMemory,
    Sqlite {
        #[serde(default = "default_sqlite_db")]
        sqlite_db: String,
    },
    Redis {
        #[serde(default = "default_redis_host")]
        redis_host: String,
        #[serde(default = "default_redis_port")]
        redis_port: u16,
    },
}

/// Producer/consumer counts for the dispatch pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_producers")]
    pub producers: usize,
    #[serde(default = "default_consumers")]
    pub consumers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            producers: default_producers(),
            consumers: default_consumers(),
        }
    }
}

/// Restart backoff for supervised tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
    /// A run lasting at least this long resets the backoff.
    #[serde(default = "default_reset_after")]
    pub reset_after_secs: u64,
}

impl SupervisorConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    pub fn reset_after(&self) -> Duration {
        Duration::from_secs(self.reset_after_secs)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
            reset_after_secs: default_reset_after(),
        }
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional log file path; logs rotate daily next to it.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Config {
    /// Reject settings the bot cannot start with.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.signal.service.trim().is_empty() {
            return Err(SignalError::Config("signal.service must not be empty".into()));
        }
        if self.signal.service.contains("://") {
            return Err(SignalError::Config(format!(
                "signal.service must not include a scheme: {}",
                self.signal.service
            )));
        }
        if self.signal.phone_number.trim().is_empty() {
            return Err(SignalError::Config(
                "signal.phone_number must not be empty".into(),
            ));
        }
        if self.dispatch.producers == 0 || self.dispatch.consumers == 0 {
            return Err(SignalError::Config(
                "dispatch.producers and dispatch.consumers must be at least 1".into(),
            ));
        }
        if self.supervisor.initial_backoff_secs > self.supervisor.max_backoff_secs {
            return Err(SignalError::Config(
                "supervisor.initial_backoff_secs exceeds max_backoff_secs".into(),
            ));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, or JSON when the extension is `.json`.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, SignalError> {
    let expanded = shellexpand(path);
    let path = Path::new(&expanded);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SignalError::Config(format!("failed to read {}: {e}", path.display())))?;

    parse(&content, path.extension().and_then(|e| e.to_str()))
}

/// Parse config text; `extension` picks the format.
pub fn parse(content: &str, extension: Option<&str>) -> Result<Config, SignalError> {
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(content)
            .map_err(|e| SignalError::Config(format!("failed to parse config: {e}"))),
        _ => toml::from_str(content)
            .map_err(|e| SignalError::Config(format!("failed to parse config: {e}"))),
    }
}
