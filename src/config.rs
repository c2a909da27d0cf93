//! Configuration module for rustible-ios
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - File named by `$RUSTIBLE_IOS_CONFIG`
//! - User configuration (~/.rustible-ios.toml)
//! - Project configuration (./rustible-ios.toml)
//! - Environment variables (`RUSTIBLE_IOS_*`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::modules::network::common::NetworkPlatform;
use crate::modules::network::resource::Prefix;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device and command rendering settings
    pub network: NetworkConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Network settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Platform assumed for offline devices
    pub platform: NetworkPlatform,

    /// Prefix used to negate a command
    pub remove_prefix: String,

    /// Optional prefix prepended to every non-negated command
    pub set_prefix: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            platform: NetworkPlatform::CiscoIos,
            remove_prefix: "no".to_string(),
            set_prefix: None,
        }
    }
}

impl NetworkConfig {
    /// Command prefixes for the resource modules
    pub fn prefix(&self) -> Prefix {
        Prefix {
            set: self.set_prefix.clone(),
            remove: self.remove_prefix.clone(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag and no `RUST_LOG` is given
    pub log_level: String,

    /// `text` or `json`
    pub log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `json` or `yaml`
    pub format: String,

    /// Colorize diffs
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rustible-ios.toml"));
        }
        paths.push(PathBuf::from("rustible-ios.toml"));

        if let Ok(env_config) = std::env::var("RUSTIBLE_IOS_CONFIG") {
            paths.insert(0, PathBuf::from(env_config));
        }

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; non-default values in `other` win
    fn merge(&self, other: Config) -> Config {
        let network_default = NetworkConfig::default();
        let logging_default = LoggingConfig::default();
        let output_default = OutputConfig::default();

        Config {
            network: NetworkConfig {
                platform: if other.network.platform != network_default.platform {
                    other.network.platform
                } else {
                    self.network.platform
                },
                remove_prefix: if other.network.remove_prefix != network_default.remove_prefix {
                    other.network.remove_prefix
                } else {
                    self.network.remove_prefix.clone()
                },
                set_prefix: other
                    .network
                    .set_prefix
                    .or_else(|| self.network.set_prefix.clone()),
            },
            logging: LoggingConfig {
                log_level: if other.logging.log_level != logging_default.log_level {
                    other.logging.log_level
                } else {
                    self.logging.log_level.clone()
                },
                log_format: if other.logging.log_format != logging_default.log_format {
                    other.logging.log_format
                } else {
                    self.logging.log_format.clone()
                },
            },
            output: OutputConfig {
                format: if other.output.format != output_default.format {
                    other.output.format
                } else {
                    self.output.format.clone()
                },
                color: other.output.color && self.output.color,
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // RUSTIBLE_IOS_PLATFORM
        if let Ok(platform) = std::env::var("RUSTIBLE_IOS_PLATFORM") {
            if let Ok(p) = platform.parse() {
                self.network.platform = p;
            }
        }

        // RUSTIBLE_IOS_REMOVE_PREFIX
        if let Ok(prefix) = std::env::var("RUSTIBLE_IOS_REMOVE_PREFIX") {
            self.network.remove_prefix = prefix;
        }

        // RUSTIBLE_IOS_SET_PREFIX
        if let Ok(prefix) = std::env::var("RUSTIBLE_IOS_SET_PREFIX") {
            self.network.set_prefix = Some(prefix).filter(|p| !p.is_empty());
        }

        // RUSTIBLE_IOS_LOG_LEVEL
        if let Ok(level) = std::env::var("RUSTIBLE_IOS_LOG_LEVEL") {
            self.logging.log_level = level;
        }

        // RUSTIBLE_IOS_LOG_FORMAT
        if let Ok(format) = std::env::var("RUSTIBLE_IOS_LOG_FORMAT") {
            self.logging.log_format = format;
        }

        // RUSTIBLE_IOS_OUTPUT
        if let Ok(format) = std::env::var("RUSTIBLE_IOS_OUTPUT") {
            self.output.format = format;
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("RUSTIBLE_IOS_NO_COLOR").is_ok() {
            self.output.color = false;
        }
    }

    /// Load from a specific file only
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.platform, NetworkPlatform::CiscoIos);
        assert_eq!(config.network.remove_prefix, "no");
        assert_eq!(config.network.prefix(), Prefix::default());
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_config_merge() {
        let base = Config::default();
        let other = Config {
            network: NetworkConfig {
                remove_prefix: "default".to_string(),
                ..NetworkConfig::default()
            },
            ..Config::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.network.remove_prefix, "default");
        assert_eq!(merged.logging.log_level, "warn");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[network]\nset_prefix = \"do\"\n\n[output]\nformat = \"yaml\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.network.set_prefix.as_deref(), Some("do"));
        assert_eq!(config.output.format, "yaml");
        assert_eq!(config.network.remove_prefix, "no");
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "logging:\n  log_level: debug").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("RUSTIBLE_IOS_REMOVE_PREFIX", "default");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.network.remove_prefix, "default");
        std::env::remove_var("RUSTIBLE_IOS_REMOVE_PREFIX");
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"output\": {{\"format\": \"yaml\"}}}}").unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.format, "yaml");
    }
}
