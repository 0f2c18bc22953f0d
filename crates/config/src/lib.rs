//! Configuration loading, validation, and management for planloop.
//!
//! Loads configuration from `~/.planloop/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tools `default_registry` knows how to build.
pub const KNOWN_TOOLS: &[&str] = &["calculator", "write_file", "get_page"];

/// Tools enabled when the config names none. `get_page` reaches the network
/// and must be enabled explicitly.
pub const DEFAULT_TOOLS: &[&str] = &["calculator", "write_file"];

/// The root configuration structure.
///
/// Maps directly to `~/.planloop/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Loop controller settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Built-in tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What the loop does when the planner names a tool nobody registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownToolPolicy {
    /// Abort the run (default)
    #[default]
    Fail,
    /// Feed a "tool not found" observation back to the planner
    Observe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum plan/act/observe iterations per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Wall-clock budget for the whole run, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub on_unknown_tool: UnknownToolPolicy,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    120
}

impl AgentSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            timeout_secs: default_timeout_secs(),
            on_unknown_tool: UnknownToolPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "buffer" or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,
}

fn default_memory_backend() -> String {
    "buffer".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Which built-in tools to register
    #[serde(default = "default_enabled_tools")]
    pub enabled: Vec<String>,

    /// Root directory `write_file` is confined to
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

fn default_enabled_tools() -> Vec<String> {
    DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect()
}
fn default_workspace_dir() -> PathBuf {
    AppConfig::workspace_dir()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_tools(),
            workspace_dir: default_workspace_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.planloop/config.toml).
    ///
    /// Environment variables override the file:
    /// - `PLANLOOP_MAX_ITERATIONS`
    /// - `PLANLOOP_TIMEOUT_SECS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var("PLANLOOP_MAX_ITERATIONS") {
            self.agent.max_iterations = raw.parse().map_err(|_| {
                ConfigError::ValidationError(format!("PLANLOOP_MAX_ITERATIONS is not a number: {raw}"))
            })?;
        }
        if let Ok(raw) = std::env::var("PLANLOOP_TIMEOUT_SECS") {
            self.agent.timeout_secs = raw.parse().map_err(|_| {
                ConfigError::ValidationError(format!("PLANLOOP_TIMEOUT_SECS is not a number: {raw}"))
            })?;
        }
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".planloop")
    }

    /// Get the workspace directory path.
    pub fn workspace_dir() -> PathBuf {
        Self::config_dir().join("workspace")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.agent.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.timeout_secs must be at least 1".into(),
            ));
        }

        if !matches!(self.memory.backend.as_str(), "buffer" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "unknown memory backend '{}' (expected \"buffer\" or \"none\")",
                self.memory.backend
            )));
        }

        if let Some(unknown) = self
            .tools
            .enabled
            .iter()
            .find(|t| !KNOWN_TOOLS.contains(&t.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "unknown tool '{unknown}' in tools.enabled"
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `planloop config --init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
