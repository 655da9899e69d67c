//! Construction-time configuration.
//!
//! All sizes are fixed when a buffer or bar is built and cannot be resized
//! afterwards. Configuration can be built in code or loaded from TOML:
//!
//! ```toml
//! [buffer]
//! capacity = 10
//!
//! [bar]
//! max_requesters = 10
//! pool_size = 10
//! max_resources_per_order = 3
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Configuration for a producer/consumer buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of items held at once
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

impl BufferConfig {
    /// Check that the configuration describes a usable buffer.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration for the bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Maximum number of simultaneously outstanding requesters; also the
    /// order queue capacity and the number of completion slots
    pub max_requesters: usize,

    /// Number of resources in the pool, identified `1..=pool_size`
    pub pool_size: u32,

    /// Maximum number of resource slots in a single order
    pub max_resources_per_order: usize,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            max_requesters: 10,
            pool_size: 10,
            max_resources_per_order: 3,
        }
    }
}

impl BarConfig {
    /// Check that the configuration describes a usable bar.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_requesters == 0 {
            return Err(ConfigError::ZeroRequesters);
        }
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        if self.max_resources_per_order == 0 {
            return Err(ConfigError::ZeroResourcesPerOrder);
        }
        Ok(())
    }
}

/// Combined configuration for both subsystems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaproomConfig {
    /// Producer/consumer buffer settings
    pub buffer: BufferConfig,

    /// Bar settings
    pub bar: BarConfig,
}

impl TaproomConfig {
    /// Parse and validate a configuration from a TOML string.
    ///
    /// Missing tables and keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate both sections.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.buffer.validate()?;
        self.bar.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TaproomConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TaproomConfig::from_toml_str("[bar]\npool_size = 5\n").unwrap();
        assert_eq!(config.bar.pool_size, 5);
        assert_eq!(config.bar.max_requesters, 10);
        assert_eq!(config.buffer, BufferConfig::default());
    }

    #[test]
    fn test_zero_values_rejected() {
        let result = TaproomConfig::from_toml_str("[buffer]\ncapacity = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ZeroCapacity))
        ));

        let bar = BarConfig {
            pool_size: 0,
            ..Default::default()
        };
        assert_eq!(bar.validate(), Err(ConfigError::ZeroPoolSize));

        let bar = BarConfig {
            max_resources_per_order: 0,
            ..Default::default()
        };
        assert_eq!(bar.validate(), Err(ConfigError::ZeroResourcesPerOrder));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = TaproomConfig::from_toml_str("[bar]\npool_size = \"many\"\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }
}
