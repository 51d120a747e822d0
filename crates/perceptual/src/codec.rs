//! Composite fingerprint codec.
//!
//! A directory fingerprint is the number of hashed elements as 8 lowercase
//! hex digits followed by a 128-bit halo hash as 32 hex digits:
//!
//! ```text
//! 00000002 0f1e2d3c4b5a69788796a5b4c3d2e1f0
//! ^count   ^digest
//! ```
//!
//! (without the space). The digest is also split into four 4-byte chunks for
//! storage layers that index each quarter separately.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hex characters used by the element count prefix.
pub const ELEMENT_COUNT_HEX_LEN: usize = 8;

/// Hex characters of a 128-bit digest.
pub const DIGEST_HEX_LEN: usize = 32;

/// Total length of an encoded fingerprint.
pub const FINGERPRINT_LEN: usize = ELEMENT_COUNT_HEX_LEN + DIGEST_HEX_LEN;

/// Number of binary chunks a digest is split into.
pub const CHUNK_COUNT: usize = 4;

/// Bytes per binary chunk.
pub const CHUNK_BYTES: usize = DIGEST_HEX_LEN / CHUNK_COUNT / 2;

/// Fingerprints that carry no signal and must stay out of comparison indexes.
///
/// The all-zero value is both the content and the structure fingerprint of an
/// empty directory.
pub const IGNORED_DIRECTORY_FINGERPRINTS: &[&str] = &["0000000000000000000000000000000000000000"];

/// Returns true for fingerprints listed in [`IGNORED_DIRECTORY_FINGERPRINTS`].
pub fn is_ignored_fingerprint(fingerprint: &str) -> bool {
    IGNORED_DIRECTORY_FINGERPRINTS.contains(&fingerprint)
}

/// Errors raised while encoding or decoding fingerprints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    #[error("invalid length: expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex in {value:?}")]
    InvalidHex { value: String },
}

fn check_hex(value: &str, expected: usize) -> Result<(), CodecError> {
    if value.len() != expected {
        return Err(CodecError::InvalidLength {
            expected,
            actual: value.len(),
        });
    }
    if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidHex {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Prefix `digest_hex` with `elements` as 8 zero-padded lowercase hex digits.
pub fn encode_fingerprint(elements: u32, digest_hex: &str) -> Result<String, CodecError> {
    check_hex(digest_hex, DIGEST_HEX_LEN)?;
    Ok(format!("{elements:08x}{digest_hex}"))
}

/// Split a fingerprint into its element count and digest.
///
/// The digest is returned verbatim. Anything that is not exactly
/// [`FINGERPRINT_LEN`] hex characters is rejected.
pub fn decode_fingerprint(fingerprint: &str) -> Result<(u32, String), CodecError> {
    check_hex(fingerprint, FINGERPRINT_LEN)?;
    let (count, digest) = fingerprint.split_at(ELEMENT_COUNT_HEX_LEN);
    let elements = u32::from_str_radix(count, 16).map_err(|_| CodecError::InvalidHex {
        value: count.to_string(),
    })?;
    Ok((elements, digest.to_string()))
}

/// Split a 32 hex character digest into four 4-byte buffers.
pub fn to_binary_chunks(digest_hex: &str) -> Result<[[u8; CHUNK_BYTES]; CHUNK_COUNT], CodecError> {
    check_hex(digest_hex, DIGEST_HEX_LEN)?;
    let mut chunks = [[0u8; CHUNK_BYTES]; CHUNK_COUNT];
    for (i, chunk) in chunks.iter_mut().enumerate() {
        let start = i * CHUNK_BYTES * 2;
        let part = &digest_hex[start..start + CHUNK_BYTES * 2];
        hex::decode_to_slice(part, chunk).map_err(|_| CodecError::InvalidHex {
            value: part.to_string(),
        })?;
    }
    Ok(chunks)
}

/// A decoded directory fingerprint.
///
/// Serializes as its encoded string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DirectoryFingerprint {
    elements: u32,
    digest: String,
}

impl DirectoryFingerprint {
    /// Build from an element count and a 32 hex character digest.
    pub fn new(elements: u32, digest_hex: impl Into<String>) -> Result<Self, CodecError> {
        let digest = digest_hex.into();
        check_hex(&digest, DIGEST_HEX_LEN)?;
        Ok(Self { elements, digest })
    }

    /// Number of hashed elements.
    pub fn elements(&self) -> u32 {
        self.elements
    }

    /// Hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The digest as four binary chunks.
    pub fn chunks(&self) -> [[u8; CHUNK_BYTES]; CHUNK_COUNT] {
        // Validated on construction.
        to_binary_chunks(&self.digest).unwrap_or_default()
    }

    /// True for the reserved empty-directory value.
    pub fn is_ignored(&self) -> bool {
        is_ignored_fingerprint(&self.to_string())
    }
}

impl fmt::Display for DirectoryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}{}", self.elements, self.digest)
    }
}

impl FromStr for DirectoryFingerprint {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (elements, digest) = decode_fingerprint(s)?;
        Ok(Self { elements, digest })
    }
}

impl TryFrom<String> for DirectoryFingerprint {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DirectoryFingerprint> for String {
    fn from(value: DirectoryFingerprint) -> Self {
        value.to_string()
    }
}
