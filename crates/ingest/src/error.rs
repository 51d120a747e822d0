//! Error types produced by the ingest crate.
//!
//! Files that are simply not candidates (directories, symlinks, binary data)
//! are not errors: [`read_text`](crate::read_text) returns `Ok(None)` for
//! them. The variants below cover files that should have been readable.
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while reading a candidate file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The file was classified as text but is not valid UTF-8.
    #[error("invalid UTF-8 in {}: {message}", path.display())]
    InvalidUtf8 { path: PathBuf, message: String },

    /// The file exceeds `max_file_bytes`.
    #[error("{} is {size} bytes, limit is {limit}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("invalid ingest config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl IngestError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        IngestError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
