//! Configuration management
//!
//! This module handles loading, validation, and management of the Warden configuration.
//! Configuration is stored in TOML format at ~/.warden/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level and format
//! - **reasoner**: Reasoner backend settings
//! - **agent**: Turn loop bounds and the origin identity trust is assessed from
//! - **trust**: Trust cache TTL, default dimension, follow-up depth
//! - **memory**: Session history and cache capacity bounds
//!
//! # Examples
//!
//! ```no_run
//! use warden_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Max iterations: {}", config.agent.max_iterations);
//! println!("Trust cache TTL: {}s", config.trust.cache_ttl_secs);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Reasoner backend configuration
    #[serde(default)]
    pub reasoner: ReasonerConfig,

    /// Turn loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Trust gate configuration
    #[serde(default)]
    pub trust: TrustConfig,

    /// Session memory bounds
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// How log lines are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line, with the current span
    Json,
}

/// Reasoner backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Backend name (only "ollama" is built in)
    #[serde(default = "default_reasoner_provider")]
    pub provider: String,

    /// Base URL for the backend API
    #[serde(default = "default_reasoner_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_reasoner_model")]
    pub model: String,

    /// Timeout for a single reasoner call, in seconds
    #[serde(default = "default_reasoner_timeout")]
    pub timeout_secs: u64,
}

/// Turn loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum Plan→Execute iterations per turn before degrading
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Identity that trust is assessed from; empty disables verification
    #[serde(default)]
    pub origin_identity: String,
}

/// Trust gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Lifetime of cached trust assessments and identity scores, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Dimension used when a step does not name one
    #[serde(default = "default_dimension")]
    pub default_dimension: String,

    /// Depth of the graph queries issued by follow-up plans
    #[serde(default = "default_follow_up_depth")]
    pub follow_up_max_depth: u32,
}

/// Session memory bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of conversation messages kept
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,

    /// Maximum number of tool call records kept
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,

    /// Maximum number of entries per cache namespace
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_reasoner_provider() -> String {
    "ollama".to_string()
}

fn default_reasoner_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_reasoner_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_reasoner_timeout() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    10
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_dimension() -> String {
    "general".to_string()
}

fn default_follow_up_depth() -> u32 {
    4
}

fn default_max_history_messages() -> usize {
    50
}

fn default_max_tool_calls() -> usize {
    200
}

fn default_max_cache_entries() -> usize {
    1024
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            provider: default_reasoner_provider(),
            base_url: default_reasoner_base_url(),
            model: default_reasoner_model(),
            timeout_secs: default_reasoner_timeout(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            origin_identity: String::new(),
        }
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            default_dimension: default_dimension(),
            follow_up_max_depth: default_follow_up_depth(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
            max_tool_calls: default_max_tool_calls(),
            max_cache_entries: default_max_cache_entries(),
        }
    }
}

impl TrustConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Config {
    /// Load configuration from the default location (~/.warden/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.warden/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".warden").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log level is unknown
    /// - The reasoner provider is unknown
    /// - Any bound is zero
    /// - The default trust dimension is blank
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_providers = ["ollama"];
        if !valid_providers.contains(&self.reasoner.provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid reasoner provider '{}'. Must be one of: {}",
                self.reasoner.provider,
                valid_providers.join(", ")
            )));
        }

        if self.reasoner.timeout_secs == 0 {
            return Err(EngineError::Config(
                "reasoner.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(EngineError::Config(
                "agent.max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.trust.cache_ttl_secs == 0 {
            return Err(EngineError::Config(
                "trust.cache_ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.trust.default_dimension.trim().is_empty() {
            return Err(EngineError::Config(
                "trust.default_dimension must not be empty".to_string(),
            ));
        }

        if self.trust.follow_up_max_depth == 0 {
            return Err(EngineError::Config(
                "trust.follow_up_max_depth must be greater than 0".to_string(),
            ));
        }

        if self.memory.max_history_messages < 2 {
            return Err(EngineError::Config(
                "memory.max_history_messages must be at least 2".to_string(),
            ));
        }

        if self.memory.max_tool_calls == 0 || self.memory.max_cache_entries == 0 {
            return Err(EngineError::Config(
                "memory bounds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.reasoner.provider, "ollama");
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.trust.cache_ttl_secs, 300);
        assert_eq!(config.trust.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.trust.follow_up_max_depth, 4);
        assert!(config.agent.origin_identity.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.memory.max_history_messages, 50);
        assert_eq!(config.trust.default_dimension, "general");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[agent]
origin_identity = "did:plc:me"

[trust]
cache_ttl_secs = 60
"#,
        )
        .unwrap();

        assert_eq!(config.agent.origin_identity, "did:plc:me");
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.trust.cache_ttl_secs, 60);
        assert_eq!(config.trust.default_dimension, "general");
    }

    #[test]
    fn test_log_format() {
        assert_eq!(Config::default().core.log_format, LogFormat::Pretty);
        let config = Config::from_toml_str("[core]\nlog_format = \"json\"\n").unwrap();
        assert_eq!(config.core.log_format, LogFormat::Json);
        assert!(Config::from_toml_str("[core]\nlog_format = \"xml\"\n").is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_toml_str("[core]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(msg) if msg.contains("log level")));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        assert!(Config::from_toml_str("[agent]\nmax_iterations = 0\n").is_err());
        assert!(Config::from_toml_str("[trust]\ncache_ttl_secs = 0\n").is_err());
        assert!(Config::from_toml_str("[memory]\nmax_cache_entries = 0\n").is_err());
        assert!(Config::from_toml_str("[trust]\ndefault_dimension = \"  \"\n").is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = Config::from_toml_str("[reasoner]\nprovider = \"carrier-pigeon\"\n").unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.trust.cache_ttl_secs, deserialized.trust.cache_ttl_secs);
        assert_eq!(
            config.memory.max_cache_entries,
            deserialized.memory.max_cache_entries
        );
    }
}
