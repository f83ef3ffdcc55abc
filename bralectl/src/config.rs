//! CLI configuration management
//!
//! Handles loading and saving CLI-specific configuration.

use anyhow::{Context, Result};
use brale_core::{default_cli_config_path, DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keys accepted by `config get` / `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "api_base_url",
    "auth_base_url",
    "default_account",
    "output_format",
    "verbose",
    "timeout",
    "max_retries",
];

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Base URL of the REST API
    pub api_base_url: String,

    /// Base URL of the authorization server
    pub auth_base_url: String,

    /// Account used when `--account` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,

    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Extra attempts for transient failures (0 = single attempt)
    pub max_retries: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            default_account: None,
            output_format: "table".to_string(),
            verbose: false,
            timeout: 30,
            max_retries: 0,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CLI config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse CLI config file {}", path.display()))
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;

        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Read a single setting by key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api_base_url" => Some(self.api_base_url.clone()),
            "auth_base_url" => Some(self.auth_base_url.clone()),
            "default_account" => self.default_account.clone(),
            "output_format" => Some(self.output_format.clone()),
            "verbose" => Some(self.verbose.to_string()),
            "timeout" => Some(self.timeout.to_string()),
            "max_retries" => Some(self.max_retries.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Update a single setting by key, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_base_url" => {
                ConfigBuilder::validate_url(value)?;
                self.api_base_url = value.to_string();
            }
            "auth_base_url" => {
                ConfigBuilder::validate_url(value)?;
                self.auth_base_url = value.to_string();
            }
            "default_account" => {
                self.default_account = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().to_string())
                };
            }
            "output_format" => {
                ConfigBuilder::validate_output_format(value)?;
                self.output_format = value.to_string();
            }
            "verbose" => self.verbose = parse_bool(value),
            "timeout" => {
                let timeout = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid timeout value. Must be a number"))?;
                ConfigBuilder::validate_timeout(timeout)?;
                self.timeout = timeout;
            }
            "max_retries" => {
                let retries = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid max_retries value. Must be a number"))?;
                ConfigBuilder::validate_max_retries(retries)?;
                self.max_retries = retries;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}. Valid keys: {}",
        key,
        CONFIG_KEYS.join(", ")
    )
}

fn parse_bool(value: &str) -> bool {
    value.to_lowercase() == "true" || value == "1"
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    api_base_url: Option<String>,
    auth_base_url: Option<String>,
    default_account: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    timeout: Option<u64>,
    max_retries: Option<u32>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a config file other than the default location
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Path of the config file this builder reads and `config set` writes
    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(default_cli_config_path)
    }

    /// Set API base URL (with validation)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.api_base_url = Some(url);
        Ok(self)
    }

    /// Set authorization server base URL (with validation)
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.auth_base_url = Some(url);
        Ok(self)
    }

    /// Set the default account
    pub fn with_default_account(mut self, account: impl Into<String>) -> Self {
        self.default_account = Some(account.into());
        self
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Set retry count (with validation)
    pub fn with_max_retries(mut self, retries: u32) -> Result<Self> {
        Self::validate_max_retries(retries)?;
        self.max_retries = Some(retries);
        Ok(self)
    }

    /// Load configuration from file
    pub fn with_config_file(self, load_file: bool) -> Result<Self> {
        if !load_file {
            return Ok(self);
        }

        let config = CliConfig::load(&self.config_path())?;
        let builder = self;
        // Only use file values if they weren't already set (preserving priority)
        Ok(Self {
            api_base_url: builder.api_base_url.or(Some(config.api_base_url)),
            auth_base_url: builder.auth_base_url.or(Some(config.auth_base_url)),
            default_account: builder.default_account.or(config.default_account),
            output_format: builder.output_format.or(Some(config.output_format)),
            verbose: builder.verbose.or(Some(config.verbose)),
            timeout: builder.timeout.or(Some(config.timeout)),
            max_retries: builder.max_retries.or(Some(config.max_retries)),
            config_path: builder.config_path,
        })
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a custom environment lookup
    ///
    /// Environment values take precedence over the config file but not over
    /// values set explicitly on the builder. Invalid values are ignored.
    pub fn with_env_lookup<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("BRALE_API_URL") {
            if Self::validate_url(&url).is_ok() {
                self.api_base_url = Some(url);
            }
        }

        if let Some(url) = env("BRALE_AUTH_URL") {
            if Self::validate_url(&url).is_ok() {
                self.auth_base_url = Some(url);
            }
        }

        if let Some(account) = env("BRALE_ACCOUNT") {
            if !account.trim().is_empty() {
                self.default_account = Some(account);
            }
        }

        if let Some(format) = env("BRALE_FORMAT") {
            if Self::validate_output_format(&format).is_ok() {
                self.output_format = Some(format);
            }
        }

        if let Some(verbose) = env("BRALE_VERBOSE") {
            self.verbose = Some(parse_bool(&verbose));
        }

        if let Some(timeout) = env("BRALE_TIMEOUT").and_then(|t| t.parse().ok()) {
            if Self::validate_timeout(timeout).is_ok() {
                self.timeout = Some(timeout);
            }
        }

        if let Some(retries) = env("BRALE_MAX_RETRIES").and_then(|r| r.parse().ok()) {
            if Self::validate_max_retries(retries).is_ok() {
                self.max_retries = Some(retries);
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let api_base_url = self.api_base_url.unwrap_or(defaults.api_base_url);
        let auth_base_url = self.auth_base_url.unwrap_or(defaults.auth_base_url);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let timeout = self.timeout.unwrap_or(defaults.timeout);
        let max_retries = self.max_retries.unwrap_or(defaults.max_retries);

        // Validate final values
        Self::validate_url(&api_base_url)?;
        Self::validate_url(&auth_base_url)?;
        Self::validate_output_format(&output_format)?;
        Self::validate_timeout(timeout)?;
        Self::validate_max_retries(max_retries)?;

        Ok(CliConfig {
            api_base_url,
            auth_base_url,
            default_account: self.default_account.filter(|a| !a.trim().is_empty()),
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout,
            max_retries,
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("URL cannot be empty"));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!("URL must start with http:// or https://"));
        }

        Ok(())
    }

    /// Validate output format
    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" | "yaml" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table', 'json' or 'yaml'",
                format
            )),
        }
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > 300 {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to 300 seconds"
            ));
        }

        Ok(())
    }

    /// Validate retry count
    fn validate_max_retries(retries: u32) -> Result<()> {
        if retries > 5 {
            return Err(anyhow::anyhow!("max_retries must be between 0 and 5"));
        }
        Ok(())
    }
}
