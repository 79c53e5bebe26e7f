//! Configuration file handling for clickloop.
//!
//! Loads configuration from `<config dir>/clickloop/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::action::{DEFAULT_DELAY_MS, DEFAULT_MIN_DELAY_MS};
use crate::app::AppSettings;
use crate::input::{Hotkey, ParseHotkeyError};
use crate::scheduler::{ClickMode, HotkeyBindings};

/// Configuration file structure for clickloop.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
    #[serde(default)]
    pub clicker: ClickerConfig,
    /// Points loaded into the registry at startup.
    #[serde(default)]
    pub points: Vec<PointConfig>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct HotkeysConfig {
    #[serde(default = "default_stop_key")]
    pub stop: String,
    /// Set to an empty string to disable the visibility hotkey.
    #[serde(default = "default_visibility_key")]
    pub visibility: String,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        HotkeysConfig {
            stop: default_stop_key(),
            visibility: default_visibility_key(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ClickerConfig {
    #[serde(default)]
    pub mode: ClickMode,
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: i64,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
}

impl Default for ClickerConfig {
    fn default() -> Self {
        ClickerConfig {
            mode: ClickMode::default(),
            default_delay_ms: default_delay_ms(),
            min_delay_ms: default_min_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct PointConfig {
    pub x: i32,
    pub y: i32,
    pub delay_ms: Option<i64>,
}

fn default_stop_key() -> String {
    "f10".to_string()
}

fn default_visibility_key() -> String {
    "f9".to_string()
}

fn default_delay_ms() -> i64 {
    DEFAULT_DELAY_MS
}

fn default_min_delay_ms() -> u64 {
    DEFAULT_MIN_DELAY_MS as u64
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid [hotkeys] {field}: {source}")]
    InvalidHotkey {
        field: &'static str,
        #[source]
        source: ParseHotkeyError,
    },
    #[error("[clicker] min_delay_ms must be greater than 0")]
    ZeroMinDelay,
}

impl Config {
    /// Load configuration from a file path, or the default path when `None`.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn hotkey_bindings(&self) -> Result<HotkeyBindings, ConfigError> {
        let stop: Hotkey = self
            .hotkeys
            .stop
            .parse()
            .map_err(|source| ConfigError::InvalidHotkey {
                field: "stop",
                source,
            })?;
        let visibility = if self.hotkeys.visibility.trim().is_empty() {
            None
        } else {
            Some(
                self.hotkeys
                    .visibility
                    .parse()
                    .map_err(|source| ConfigError::InvalidHotkey {
                        field: "visibility",
                        source,
                    })?,
            )
        };
        Ok(HotkeyBindings { stop, visibility })
    }

    /// Validated settings for building a [`crate::app::ClickerApp`].
    pub fn app_settings(&self) -> Result<AppSettings, ConfigError> {
        if self.clicker.min_delay_ms == 0 {
            return Err(ConfigError::ZeroMinDelay);
        }
        Ok(AppSettings {
            mode: self.clicker.mode,
            default_delay_ms: self.clicker.default_delay_ms,
            min_delay: Duration::from_millis(self.clicker.min_delay_ms),
            hotkeys: self.hotkey_bindings()?,
        })
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("clickloop").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/clickloop/config.toml")
        })
}

/// Contents written by `clickloop config init`.
pub const DEFAULT_CONFIG: &str = r#"# clickloop configuration

[hotkeys]
# Stops a running clicker
stop = "f10"
# Asks the front end to show/hide itself (empty string disables)
visibility = "f9"

[clicker]
# parallel: every point clicks on its own timer
# sequential: one point at a time, in order
mode = "parallel"
# Delay given to new points (milliseconds)
default_delay_ms = 1000
# Used instead of zero or negative delays (milliseconds)
min_delay_ms = 100

# Points clicked by `clickloop run`
# [[points]]
# x = 100
# y = 200
# delay_ms = 500
"#;
