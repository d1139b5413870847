//! Configuration loading for the StaffSync TUI.
//!
//! All fields are required. No defaults.

use crate::constants::{DashboardSettings, MAX_FETCH_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub persistence_path: PathBuf,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Initial palette, `light` or `dark`. A persisted preference wins.
    pub mode: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    pub page_size: usize,
    pub fetch_limit: usize,
    pub freshness_window_ms: u64,
    pub etl_wait_ms: u64,
    pub source_list_limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or STAFFSYNC_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: TuiConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.logging.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter",
                reason: "must not be empty".to_string(),
            });
        }
        match self.theme.mode.trim().to_ascii_lowercase().as_str() {
            "light" | "dark" => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "theme.mode",
                    reason: "must be 'light' or 'dark'".to_string(),
                })
            }
        }
        if self.dashboard.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.page_size",
                reason: "must be > 0".to_string(),
            });
        }
        if self.dashboard.fetch_limit == 0 || self.dashboard.fetch_limit > MAX_FETCH_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.fetch_limit",
                reason: format!("must be between 1 and {}", MAX_FETCH_LIMIT),
            });
        }
        if self.dashboard.freshness_window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.freshness_window_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.dashboard.source_list_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.source_list_limit",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn dark_mode(&self) -> bool {
        self.theme.mode.trim().eq_ignore_ascii_case("dark")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            page_size: self.dashboard.page_size,
            fetch_limit: self.dashboard.fetch_limit,
            freshness_window: Duration::from_millis(self.dashboard.freshness_window_ms),
            etl_wait: Duration::from_millis(self.dashboard.etl_wait_ms),
            source_list_limit: self.dashboard.source_list_limit,
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("STAFFSYNC_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
