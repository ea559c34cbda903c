//! Configuration types for twig-cs-fixer.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Standard to start from (e.g., "TwigCsFixer", "Twig").
    #[serde(default)]
    pub standard: Option<String>,

    /// Severity threshold for failure (default: "error").
    /// Violations at or above this severity make the run fail.
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Location of the cache file, relative to the project root.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// File discovery and execution settings.
    #[serde(default)]
    pub linter: LinterConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Rules are enabled unless disabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Severity at which a run fails.
    ///
    /// # Errors
    ///
    /// Returns an error if `fail_on` is not a severity name.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        match self.fail_on.as_deref() {
            None => Ok(Severity::Error),
            Some(name) => Severity::from_name(name).ok_or_else(|| ConfigError::Invalid {
                key: "fail_on".to_string(),
                message: format!("unknown severity `{name}`"),
            }),
        }
    }
}

/// File discovery and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Root directory to lint (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from linting.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, every template file).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of files processed in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// File extensions treated as templates.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/vendor/**".to_string(), "**/node_modules/**".to_string()],
            include: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
            extensions: default_extensions(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["twig".to_string()]
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Restricts the rule to files matching these globs (relative to root).
    #[serde(default)]
    pub paths: Vec<String>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a non-negative integer option with a default value.
    #[must_use]
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value is well-formed TOML but not acceptable.
    #[error("Invalid value for `{key}`: {message}")]
    Invalid {
        /// Offending key.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}
