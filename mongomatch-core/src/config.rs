//! Configuration management for mongomatch
//!
//! This module provides:
//! - Matcher limits (recursion depth, compiled regex size)
//! - Slow filter reporting threshold
//! - TOML loading with validation and defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default recursion limit for nested definitions
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default compiled size limit for `$regex` patterns (10 MiB)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * 1024 * 1024;

/// Default slow filter threshold in milliseconds
pub const DEFAULT_SLOW_FILTER_THRESHOLD_MS: u64 = 100;

/// Matcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Maximum nesting depth of a query definition
    pub max_depth: usize,
    /// Size limit passed to the regex compiler
    pub regex_size_limit: usize,
    /// Filter passes slower than this are logged as warnings
    pub slow_filter_threshold_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            slow_filter_threshold_ms: DEFAULT_SLOW_FILTER_THRESHOLD_MS,
        }
    }
}

impl MatcherConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MatcherConfig =
            toml::from_str(content).context("Failed to parse matcher configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize matcher configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(anyhow::anyhow!("Max depth cannot be 0"));
        }

        if self.regex_size_limit == 0 {
            return Err(anyhow::anyhow!("Regex size limit cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = MatcherConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.regex_size_limit, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MatcherConfig::from_toml_str("max_depth = 16").unwrap();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.slow_filter_threshold_ms, DEFAULT_SLOW_FILTER_THRESHOLD_MS);
    }

    #[test]
    fn test_config_validation() {
        assert!(MatcherConfig::from_toml_str("max_depth = 0").is_err());
        assert!(MatcherConfig::from_toml_str("regex_size_limit = 0").is_err());
        assert!(MatcherConfig::from_toml_str("max_depth = \"deep\"").is_err());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let config = MatcherConfig {
            max_depth: 32,
            regex_size_limit: 4096,
            slow_filter_threshold_ms: 5,
        };

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes()).unwrap();

        let loaded = MatcherConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = MatcherConfig::from_file(Path::new("/nonexistent/mongomatch.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
