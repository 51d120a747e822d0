//! Configuration and error types for halofp file fingerprinting.
//!
//! The three numeric parameters here (n-gram length, window length, digest
//! width) define the matching scheme itself: two fingerprints are only
//! comparable when they were produced with the same values. The defaults are
//! the canonical scheme and should not be changed casually.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tokens joined into one n-gram.
pub const DEFAULT_NGRAM_LENGTH: usize = 8;

/// Number of n-grams per hailstorm window.
pub const DEFAULT_WINDOW_LENGTH: usize = 64;

/// Width in bits of every halo hash digest.
pub const DEFAULT_DIGEST_BITS: usize = 128;

/// Digest widths backed by a cryptographic hash of the same size.
pub const SUPPORTED_DIGEST_BITS: [usize; 3] = [128, 160, 256];

/// Configuration for the file fingerprint pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter a fingerprint must bump this version, so
    /// that stored fingerprints can be traced back to the scheme that made
    /// them.
    pub version: u32,
    /// Tokens per n-gram.
    pub ngram_length: usize,
    /// N-grams per window fed to the hailstorm selector.
    pub window_length: usize,
    /// Halo hash width in bits, for both the whole-file and chunk digests.
    pub digest_bits: usize,
    /// Hash the selected windows on the rayon pool.
    ///
    /// Output is identical either way; only throughput changes.
    pub use_parallel: bool,
}

impl PerceptualConfig {
    /// Create a new configuration with the canonical scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the n-gram length in tokens.
    pub fn with_ngram_length(mut self, ngram_length: usize) -> Self {
        self.ngram_length = ngram_length;
        self
    }

    /// Set the window length in n-grams.
    pub fn with_window_length(mut self, window_length: usize) -> Self {
        self.window_length = window_length;
        self
    }

    /// Set the digest width in bits. See [`SUPPORTED_DIGEST_BITS`].
    pub fn with_digest_bits(mut self, digest_bits: usize) -> Self {
        self.digest_bits = digest_bits;
        self
    }

    /// Enable or disable parallel chunk hashing.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.ngram_length < 1 {
            return Err(PerceptualError::InvalidConfigNgramLength {
                ngram_length: self.ngram_length,
            });
        }
        if self.window_length < 1 {
            return Err(PerceptualError::InvalidConfigWindowLength {
                window_length: self.window_length,
            });
        }
        if !SUPPORTED_DIGEST_BITS.contains(&self.digest_bits) {
            return Err(PerceptualError::UnsupportedDigestBits {
                bits: self.digest_bits,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
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

/// Errors returned by the fingerprinting pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: ngram_length must be >= 1 (got {ngram_length})")]
    InvalidConfigNgramLength { ngram_length: usize },

    #[error("invalid config: window_length must be >= 1 (got {window_length})")]
    InvalidConfigWindowLength { window_length: usize },

    #[error("no hash available for a {bits}-bit halo hash; expected one of 128, 160, 256")]
    UnsupportedDigestBits { bits: usize },

    #[error("cannot compare a {left}-bit halo hash with a {right}-bit one")]
    DigestWidthMismatch { left: usize, right: usize },
}
