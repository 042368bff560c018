use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What a condition with an operator the engine does not know evaluates to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOperatorPolicy {
    /// Treat the condition as satisfied
    #[default]
    FailOpen,
    /// Treat the condition as not satisfied
    FailClosed,
}

/// Limits and policies applied by the rule engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub unknown_operator: UnknownOperatorPolicy,
    #[serde(default = "default_max_formula_length")]
    pub max_formula_length: usize,
    #[serde(default = "default_max_formula_depth")]
    pub max_formula_depth: usize,
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,
}

fn default_max_formula_length() -> usize {
    1024
}

fn default_max_formula_depth() -> usize {
    64
}

fn default_max_pattern_length() -> usize {
    512
}

fn default_regex_size_limit() -> usize {
    1 << 20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown_operator: UnknownOperatorPolicy::default(),
            max_formula_length: default_max_formula_length(),
            max_formula_depth: default_max_formula_depth(),
            max_pattern_length: default_max_pattern_length(),
            regex_size_limit: default_regex_size_limit(),
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Tighter limits, and unknown operators never grant their effect
    pub fn strict() -> Self {
        Self {
            unknown_operator: UnknownOperatorPolicy::FailClosed,
            max_formula_length: 256,
            max_formula_depth: 16,
            max_pattern_length: 128,
            regex_size_limit: 1 << 16,
        }
    }
}

#[derive(Debug)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self { config: EngineConfig::default() }
    }

    pub fn unknown_operator(mut self, policy: UnknownOperatorPolicy) -> Self {
        self.config.unknown_operator = policy;
        self
    }

    pub fn max_formula_length(mut self, length: usize) -> Self {
        self.config.max_formula_length = length;
        self
    }

    pub fn max_formula_depth(mut self, depth: usize) -> Self {
        self.config.max_formula_depth = depth;
        self
    }

    pub fn max_pattern_length(mut self, length: usize) -> Self {
        self.config.max_pattern_length = length;
        self
    }

    pub fn regex_size_limit(mut self, limit: usize) -> Self {
        self.config.regex_size_limit = limit;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `<form_id>.json` / `<form_id>.toml` metadata files
    #[serde(default)]
    pub metadata_dir: Option<PathBuf>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("form-rules")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".form-rules")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!(
            "Loaded config (metadata_dir: {:?}, unknown operators: {:?})",
            config.metadata_dir, config.engine.unknown_operator
        );
        Ok(config)
    }

    /// Resolve the metadata directory, preferring an explicit override
    pub fn metadata_dir(&self, override_dir: Option<PathBuf>) -> PathBuf {
        override_dir
            .or_else(|| self.metadata_dir.clone())
            .unwrap_or_else(|| PathBuf::from("forms"))
    }
}
