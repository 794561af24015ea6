//! Intake Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults that load the built-in recognition model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the recognition model compiled into the extractor crate
pub const DEFAULT_MODEL: &str = "en_lexicon_sm";

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Entity-recognition backend
    pub nlp: NlpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // NLP backend
        if let Ok(enabled) = std::env::var("INTAKE_NLP_ENABLED") {
            self.nlp.enabled = parse_bool("INTAKE_NLP_ENABLED", &enabled)?;
        }
        if let Ok(model) = std::env::var("INTAKE_NLP_MODEL") {
            if !model.trim().is_empty() {
                self.nlp.model = model;
            }
        }
        if let Ok(dir) = std::env::var("INTAKE_MODEL_DIR") {
            self.nlp.model_dir = Some(PathBuf::from(dir));
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Entity-recognition backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    /// Attempt to load a recognizer at all
    pub enabled: bool,

    /// Model identifier: a built-in name, a file stem in `model_dir`, or a path
    pub model: String,

    /// Directory searched for `<model>.json`
    pub model_dir: Option<PathBuf>,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_MODEL.to_string(),
            model_dir: None,
        }
    }
}

impl NlpConfig {
    /// Config that never loads a recognizer (pattern/lexicon mode only)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Config loading the given model identifier
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
