//! Configuration types for file admission.
//!
//! [`IngestConfig`] controls how much of a file is sniffed to decide whether it
//! is text and how large a file may be before it is refused.
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default().with_max_file_bytes(Some(10 * 1024 * 1024));
//! config.validate().expect("valid configuration");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes read from the head of a file to classify it.
pub const DEFAULT_SNIFF_BYTES: usize = 8192;

/// Runtime configuration for reading candidate files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Configuration schema version.
    ///
    /// Default: `1`
    pub version: u32,

    /// Number of leading bytes inspected by the heuristic classifier.
    ///
    /// Default: [`DEFAULT_SNIFF_BYTES`]
    pub sniff_bytes: usize,

    /// Files larger than this are refused with
    /// [`IngestError::FileTooLarge`](crate::IngestError::FileTooLarge).
    /// `None` means no limit.
    pub max_file_bytes: Option<u64>,
}

/// Invalid [`IngestConfig`] values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported ingest config version {version}")]
    InvalidVersion { version: u32 },

    #[error("sniff_bytes must be greater than zero")]
    ZeroSniffBytes,

    #[error("max_file_bytes must be greater than zero when set")]
    ZeroMaxFileBytes,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: 1,
            sniff_bytes: DEFAULT_SNIFF_BYTES,
            max_file_bytes: None,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sniff_bytes(mut self, sniff_bytes: usize) -> Self {
        self.sniff_bytes = sniff_bytes;
        self
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: Option<u64>) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Check the configuration before first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::InvalidVersion {
                version: self.version,
            });
        }
        if self.sniff_bytes == 0 {
            return Err(ConfigError::ZeroSniffBytes);
        }
        if self.max_file_bytes == Some(0) {
            return Err(ConfigError::ZeroMaxFileBytes);
        }
        Ok(())
    }
}
