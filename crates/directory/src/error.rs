use std::path::PathBuf;

use perceptual::{CodecError, PerceptualError};
use thiserror::Error;

use crate::resource::ResourceId;

/// Errors raised while building a codebase or computing directory
/// fingerprints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DirectoryError {
    #[error("unknown resource id {0}")]
    UnknownResource(ResourceId),

    #[error("{path:?} is not a directory")]
    NotADirectory { path: String },

    #[error("a resource already exists at {path:?}")]
    DuplicatePath { path: String },

    #[error("invalid resource name {name:?}")]
    InvalidName { name: String },

    #[error("failed to save {path:?}: {message}")]
    Save { path: String, message: String },

    #[error("failed to scan {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
}

impl DirectoryError {
    pub(crate) fn io(path: &std::path::Path, message: impl ToString) -> Self {
        DirectoryError::Io {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
