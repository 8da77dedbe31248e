//! Configuration management for margin.
//!
//! Parses `margin.toml` with serde and discovers it in the current
//! directory or any parent. CLI flags are applied on top through
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in the `[ai]` section support:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `ai.endpoint`, `ai.api_key`, `ai.model`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use mg_directives::{DEFAULT_DELIMITER, EngineConfig, UnknownDirectivePolicy};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "margin.toml";

/// Upper bound for `ai.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 600;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the unprocessed-directive policy.
    pub unknown: Option<UnknownDirectivePolicy>,
    /// Override whether AI directives are resolved.
    pub ai_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directive engine settings.
    pub directives: DirectivesConfig,
    /// AI resolution settings.
    pub ai: AiConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[directives]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DirectivesConfig {
    /// Policy for directives no handler claimed.
    pub unknown: UnknownDirectivePolicy,
    /// Section delimiter line.
    pub delimiter: String,
    /// Accept up to three spaces before `::`.
    pub allow_indented: bool,
    /// Ignore directive lines inside fenced code blocks.
    pub skip_code_fences: bool,
}

impl Default for DirectivesConfig {
    fn default() -> Self {
        Self {
            unknown: UnknownDirectivePolicy::Warn,
            delimiter: DEFAULT_DELIMITER.to_owned(),
            allow_indented: false,
            skip_code_fences: true,
        }
    }
}

impl DirectivesConfig {
    /// Engine configuration for these settings.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_unknown(self.unknown)
            .with_delimiter(self.delimiter.clone())
            .with_allow_indented(self.allow_indented)
            .with_skip_code_fences(self.skip_code_fences)
    }
}

/// `[ai]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Whether `::ai` directives are sent to the endpoint.
    pub enabled: bool,
    /// OpenAI-compatible API base URL.
    pub endpoint: String,
    /// Bearer token; empty means none.
    pub api_key: String,
    /// Default model.
    pub model: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "${MARGIN_AI_ENDPOINT:-https://api.openai.com/v1}".to_owned(),
            api_key: "${OPENAI_API_KEY:-}".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl AiConfig {
    /// Per-call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key, if one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        Some(self.api_key.as_str()).filter(|k| !k.is_empty())
    }

    /// Validate settings needed to call the endpoint.
    ///
    /// Only checked when AI resolution is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        require_non_empty(&self.endpoint, "ai.endpoint")?;
        require_http_url(&self.endpoint, "ai.endpoint")?;
        require_non_empty(&self.model, "ai.model")?;
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "ai.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`ai.api_key`").
        field: String,
        /// Error message (e.g., "${`OPENAI_API_KEY`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `margin.toml` in the current directory and its parents, falling
    /// back to defaults. CLI settings are applied last.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if
    /// parsing, expansion, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            let mut config = Self::default();
            config.finish()?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.finish()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = &self.directives.delimiter;
        require_non_empty(delimiter, "directives.delimiter")?;
        if delimiter.contains(['\n', '\r']) {
            return Err(ConfigError::Validation(
                "directives.delimiter must be a single line".to_owned(),
            ));
        }
        self.ai.validate()
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(unknown) = settings.unknown {
            self.directives.unknown = unknown;
        }
        if let Some(enabled) = settings.ai_enabled {
            self.ai.enabled = enabled;
        }
    }

    /// Expand environment variables, then validate.
    fn finish(&mut self) -> Result<(), ConfigError> {
        self.ai.endpoint = expand::expand_env(&self.ai.endpoint, "ai.endpoint")?;
        self.ai.api_key = expand::expand_env(&self.ai.api_key, "ai.api_key")?;
        self.ai.model = expand::expand_env(&self.ai.model, "ai.model")?;
        self.validate()
    }
}

/// Search for `margin.toml` in `start` and its parents.
#[must_use]
pub fn discover_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
