//! Configuration loading, validation, and management for promptsh.
//!
//! Loads configuration from `~/.promptsh/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use promptsh_core::error::ConfigError;

/// The root configuration structure.
///
/// Maps directly to `~/.promptsh/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model name passed to the completion service
    #[serde(default = "default_model")]
    pub model: String,

    /// Print the reply as it streams in
    #[serde(default = "default_true")]
    pub stream: bool,

    /// Completion service settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Sanitizer and executor settings
    #[serde(default)]
    pub shell: ShellConfig,

    /// Tool-awareness registry settings
    #[serde(default)]
    pub awareness: AwarenessConfig,

    /// Audit logging
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_model() -> String {
    "llama3.2".into()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for a whole generation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Leading words a command may start with
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,

    /// Tool names the model sometimes echoes in front of a command
    #[serde(default = "default_tool_prefixes")]
    pub tool_prefixes: Vec<String>,

    /// Marker that tags a reply as a command
    #[serde(default = "default_sentinel")]
    pub sentinel: char,

    /// Shell used to run commands; `None` picks `sh` (or `cmd` on Windows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

pub fn default_allowed_commands() -> Vec<String> {
    [
        "ls", "cd", "pwd", "mkdir", "touch", "rm", "cp", "mv", "cat", "echo", "git", "npm", "pip",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_tool_prefixes() -> Vec<String> {
    ["file_manager", "web_search", "system_control"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sentinel() -> char {
    '!'
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            allowed_commands: default_allowed_commands(),
            tool_prefixes: default_tool_prefixes(),
            sentinel: default_sentinel(),
            program: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwarenessConfig {
    /// Registry file; defaults to `~/.promptsh/awareness.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.promptsh/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `PROMPTSH_MODEL`
    /// - `PROMPTSH_OLLAMA_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("PROMPTSH_MODEL") {
            config.model = model;
        }

        if let Ok(url) = std::env::var("PROMPTSH_OLLAMA_URL") {
            config.ollama.base_url = url;
        }

        config.validate()?;
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

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".promptsh")
    }

    /// Resolved path of the awareness registry file.
    pub fn awareness_path(&self) -> PathBuf {
        match &self.awareness.path {
            Some(p) => PathBuf::from(p),
            None => Self::config_dir().join("awareness.json"),
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if !self.ollama.base_url.starts_with("http://") && !self.ollama.base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "ollama.base_url must be an http(s) URL, got '{}'",
                self.ollama.base_url
            )));
        }

        if let Some(t) = self.ollama.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "ollama.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.shell.allowed_commands.is_empty() {
            return Err(ConfigError::ValidationError(
                "shell.allowed_commands must list at least one command".into(),
            ));
        }

        if let Some(bad) = self
            .shell
            .allowed_commands
            .iter()
            .find(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::ValidationError(format!(
                "shell.allowed_commands entry '{bad}' must be a single word"
            )));
        }

        if self.shell.sentinel.is_whitespace() {
            return Err(ConfigError::ValidationError(
                "shell.sentinel must not be whitespace".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            stream: true,
            ollama: OllamaConfig::default(),
            shell: ShellConfig::default(),
            awareness: AwarenessConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

/// Get the user's home directory.
pub fn dirs_home() -> PathBuf {
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
