//! Acquisition configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ut32x_protocol::DataSource;

use crate::error::Result;

/// Configuration for one acquisition run
///
/// ```rust
/// use ut32x_driver::AcquisitionConfig;
///
/// let config = AcquisitionConfig::from_json(r#"{"data_source": "memory", "limit_samples": 10}"#).unwrap();
/// assert_eq!(config.limit_samples, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Live readings or stored memory
    pub data_source: DataSource,
    /// Stop after this many frames; `None` or 0 means unlimited
    pub limit_samples: Option<u64>,
    /// Timeout for start/stop commands in milliseconds
    pub command_timeout_ms: u32,
}

impl AcquisitionConfig {
    /// Parse a configuration from JSON, filling in defaults for missing keys
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.command_timeout_ms))
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::Live,
            limit_samples: None,
            command_timeout_ms: 5,
        }
    }
}
