//! Configuration via `galaxy.toml`
//!
//! A missing file means defaults. `galaxy init` writes the commented default
//! file; edit it and restart.

use crate::{Error, Result};
use galaxy_core::{DocumentLimits, KdfParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "galaxy.toml";

/// Error reporting options. Persisted under `[errors]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorConfig {
    /// Report validation and patch failures as 500 instead of 400.
    pub legacy_validation_status: bool,
}

/// Configuration loaded from `galaxy.toml`.
///
/// # Example
///
/// ```toml
/// [errors]
/// legacy_validation_status = false
///
/// [password]
/// iterations = 10000
/// key_len = 64
/// salt_len = 16
///
/// [limits]
/// max_document_bytes = 16777216
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Error reporting options
    pub errors: ErrorConfig,
    /// Password key derivation parameters
    pub password: KdfParams,
    /// Document limits
    pub limits: DocumentLimits,
}

impl GalaxyConfig {
    /// Reject settings no operation can work with.
    pub fn validate(&self) -> Result<()> {
        if self.password.iterations == 0 {
            return Err(Error::InvalidInput {
                reason: "password.iterations must be positive".into(),
            });
        }
        if self.password.key_len == 0 || self.password.salt_len == 0 {
            return Err(Error::InvalidInput {
                reason: "password.key_len and password.salt_len must be positive".into(),
            });
        }
        if self.limits.max_nesting_depth == 0 || self.limits.max_document_bytes == 0 {
            return Err(Error::InvalidInput {
                reason: "limits.max_nesting_depth and limits.max_document_bytes must be positive"
                    .into(),
            });
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Galaxy configuration

[errors]
# Report validation and patch failures as 500 instead of 400 (default: false)
legacy_validation_status = false

[password]
# PBKDF2-HMAC-SHA256 parameters for stored passwords.
# Changing them invalidates every stored digest.
iterations = 10000
key_len = 64
salt_len = 16

[limits]
max_document_bytes = 16777216
max_nesting_depth = 100
max_path_length = 256
max_array_len = 1000000
"#
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GalaxyConfig = toml::from_str(content).map_err(|e| Error::InvalidInput {
            reason: format!("invalid config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Internal {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| Error::InvalidInput {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })
    }

    /// Read config from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Internal {
                reason: format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Serialization {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Internal {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }
}
