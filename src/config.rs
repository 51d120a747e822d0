//! YAML Configuration File Support for halofp
//!
//! All stage settings live in one YAML file. Every section and every field is
//! optional; missing values take the defaults of the fingerprinting scheme.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # halofp configuration
//! version: "1.0"
//!
//! ingest:
//!   version: 1
//!   sniff_bytes: 8192
//!   max_file_bytes: 52428800
//!
//! perceptual:
//!   version: 1
//!   ngram_length: 8
//!   window_length: 64
//!   digest_bits: 128
//!   use_parallel: false
//!
//! directory:
//!   schema: "dedicated"
//!   use_parallel: true
//! ```
//!
//! Changing `ngram_length`, `window_length` or `digest_bits` produces
//! fingerprints that cannot be compared with the default scheme.

use std::fs;
use std::path::Path;

use directory::{DirectoryConfig, FingerprintSchema};
use ingest::{IngestConfig, DEFAULT_SNIFF_BYTES};
use perceptual::{
    PerceptualConfig, DEFAULT_DIGEST_BITS, DEFAULT_NGRAM_LENGTH, DEFAULT_WINDOW_LENGTH,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for every halofp stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HalofpConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub ingest: IngestYamlConfig,

    #[serde(default)]
    pub perceptual: PerceptualYamlConfig,

    #[serde(default)]
    pub directory: DirectoryYamlConfig,
}

impl HalofpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: HalofpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.ingest_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("ingest: {err}")))?;
        self.perceptual_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("perceptual: {err}")))?;

        Ok(())
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            version: self.ingest.version,
            sniff_bytes: self.ingest.sniff_bytes,
            max_file_bytes: self.ingest.max_file_bytes,
        }
    }

    pub fn perceptual_config(&self) -> PerceptualConfig {
        PerceptualConfig {
            version: self.perceptual.version,
            ngram_length: self.perceptual.ngram_length,
            window_length: self.perceptual.window_length,
            digest_bits: self.perceptual.digest_bits,
            use_parallel: self.perceptual.use_parallel,
        }
    }

    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig::new().with_parallel(self.directory.use_parallel)
    }

    pub fn schema(&self) -> FingerprintSchema {
        self.directory.schema
    }
}

impl Default for HalofpConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            ingest: IngestYamlConfig::default(),
            perceptual: PerceptualYamlConfig::default(),
            directory: DirectoryYamlConfig::default(),
        }
    }
}

/// Ingest stage YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,

    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

impl Default for IngestYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            sniff_bytes: DEFAULT_SNIFF_BYTES,
            max_file_bytes: None,
        }
    }
}

/// File fingerprint YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptualYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_ngram_length")]
    pub ngram_length: usize,

    #[serde(default = "default_window_length")]
    pub window_length: usize,

    #[serde(default = "default_digest_bits")]
    pub digest_bits: usize,

    #[serde(default)]
    pub use_parallel: bool,
}

impl Default for PerceptualYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ngram_length: DEFAULT_NGRAM_LENGTH,
            window_length: DEFAULT_WINDOW_LENGTH,
            digest_bits: DEFAULT_DIGEST_BITS,
            use_parallel: false,
        }
    }
}

/// Directory fingerprint YAML configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryYamlConfig {
    /// Where directory fingerprints are stored on each resource.
    #[serde(default)]
    pub schema: FingerprintSchema,

    /// Fingerprint files and directories on the rayon pool.
    #[serde(default)]
    pub use_parallel: bool,
}

fn default_format_version() -> String {
    "1.0".to_string()
}
fn default_version() -> u32 {
    1
}
fn default_sniff_bytes() -> usize {
    DEFAULT_SNIFF_BYTES
}
fn default_ngram_length() -> usize {
    DEFAULT_NGRAM_LENGTH
}
fn default_window_length() -> usize {
    DEFAULT_WINDOW_LENGTH
}
fn default_digest_bits() -> usize {
    DEFAULT_DIGEST_BITS
}
