//! halofp Ingest Layer
//!
//! This is where files enter the fingerprinting pipeline. Given a path we
//! decide whether it is a candidate at all, and if it is, read it as strict
//! UTF-8 text.
//!
//! ## What we do here
//!
//! - **Guard** - Only regular files are read. Symlinks are never followed.
//! - **Classify** - A [`ContentClassifier`] decides text vs binary. The
//!   default sniffs the first [`IngestConfig::sniff_bytes`] bytes.
//! - **Read** - Text is decoded strictly; bad UTF-8 is an error, not a lossy
//!   replacement.
//! - **Log everything** - Structured logs via tracing.
//!
//! Non-candidates are not errors: [`read_text`] returns `Ok(None)` for them.
//!
//! ## Example
//!
//! ```
//! use ingest::{read_text, IngestConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("hello.txt");
//! std::fs::write(&path, "hello world").unwrap();
//!
//! let file = read_text(&path, &IngestConfig::default()).unwrap().unwrap();
//! assert_eq!(file.text, "hello world");
//! assert!(read_text(dir.path(), &IngestConfig::default()).unwrap().is_none());
//! ```
//!
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn, Level};

mod classify;
mod config;
mod error;

pub use crate::classify::{
    is_regular_file, Classification, ContentClassifier, HeuristicClassifier,
};
pub use crate::config::{ConfigError, IngestConfig, DEFAULT_SNIFF_BYTES};
pub use crate::error::IngestError;

/// A candidate file read as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub path: PathBuf,
    pub size: u64,
    pub text: String,
}

/// Read `path` as text using the default heuristic classifier.
pub fn read_text(path: &Path, cfg: &IngestConfig) -> Result<Option<TextFile>, IngestError> {
    read_text_with(path, cfg, &HeuristicClassifier::from_config(cfg))
}

/// Read `path` as text, deciding text vs binary with `classifier`.
pub fn read_text_with<C>(
    path: &Path,
    cfg: &IngestConfig,
    classifier: &C,
) -> Result<Option<TextFile>, IngestError>
where
    C: ContentClassifier + ?Sized,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "ingest.read_text", path = %path.display());
    let _guard = span.enter();

    match read_text_inner(path, cfg, classifier) {
        Ok(Some(file)) => {
            let elapsed_micros = start.elapsed().as_micros();
            info!(
                size = file.size,
                text_len = file.text.len(),
                elapsed_micros,
                "ingest_success"
            );
            Ok(Some(file))
        }
        Ok(None) => {
            let elapsed_micros = start.elapsed().as_micros();
            debug!(elapsed_micros, "ingest_skipped");
            Ok(None)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "ingest_failure");
            Err(err)
        }
    }
}

fn read_text_inner<C>(
    path: &Path,
    cfg: &IngestConfig,
    classifier: &C,
) -> Result<Option<TextFile>, IngestError>
where
    C: ContentClassifier + ?Sized,
{
    cfg.validate()?;

    if !is_regular_file(path) {
        debug!(reason = "not_regular_file", "ingest_not_candidate");
        return Ok(None);
    }

    let size = fs::metadata(path)
        .map_err(|err| IngestError::io(path, &err))?
        .len();
    if let Some(limit) = cfg.max_file_bytes {
        if size > limit {
            return Err(IngestError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }
    }

    let classification = classifier.classify(path)?;
    if !classification.is_text {
        debug!(reason = "not_text", is_binary = classification.is_binary, "ingest_not_candidate");
        return Ok(None);
    }

    let bytes = fs::read(path).map_err(|err| IngestError::io(path, &err))?;
    let text = String::from_utf8(bytes).map_err(|err| IngestError::InvalidUtf8 {
        path: path.to_path_buf(),
        message: err.utf8_error().to_string(),
    })?;

    Ok(Some(TextFile {
        path: path.to_path_buf(),
        size,
        text,
    }))
}
