//! Normalization layer configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! [decoders]
//! default_platform = "bluez"
//! enabled = ["bluez", "corebluetooth"]
//!
//! [discovery]
//! service_uuids = ["0000fce0-0000-1000-8000-00805f9b34fb"]
//! manufacturer_ids = [1794]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which platform decoders to register.
    pub decoders: DecoderConfig,
    /// Which advertisements the device table accepts.
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - At least one decoder is enabled
    /// - The default platform is among the enabled decoders
    /// - Filter UUIDs are not empty strings
    ///
    /// # Example
    ///
    /// ```
    /// use blemeta_core::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.decoders.validate());
        errors.extend(self.discovery.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Decoder registration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Platform used when the caller does not name one.
    pub default_platform: Option<Platform>,
    /// Platforms whose decoders are registered.
    pub enabled: Vec<Platform>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            default_platform: Platform::current(),
            enabled: Platform::ALL.to_vec(),
        }
    }
}

impl DecoderConfig {
    /// Validate decoder settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.enabled.is_empty() {
            errors.push(ValidationError {
                field: "decoders.enabled".to_string(),
                message: "at least one decoder must be enabled".to_string(),
            });
        }

        if let Some(default) = self.default_platform
            && !self.enabled.contains(&default)
        {
            errors.push(ValidationError {
                field: "decoders.default_platform".to_string(),
                message: format!("'{}' is not in decoders.enabled", default),
            });
        }

        errors
    }
}

/// Advertisement filters applied by the device table.
///
/// Empty lists accept everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Accept devices advertising any of these service UUIDs (case-insensitive).
    pub service_uuids: Vec<String>,
    /// Accept devices advertising manufacturer data for any of these company ids.
    pub manufacturer_ids: Vec<u16>,
}

impl DiscoveryConfig {
    /// Validate discovery filters.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.service_uuids
            .iter()
            .enumerate()
            .filter(|(_, uuid)| uuid.trim().is_empty())
            .map(|(i, _)| ValidationError {
                field: format!("discovery.service_uuids[{}]", i),
                message: "service UUID cannot be empty".to_string(),
            })
            .collect()
    }

    /// Returns `true` if no filter is configured.
    pub fn accepts_all(&self) -> bool {
        self.service_uuids.is_empty() && self.manufacturer_ids.is_empty()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `decoders.enabled` or `discovery.service_uuids[0]`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
