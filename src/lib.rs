//! Workspace umbrella crate for halofp.
//!
//! This crate stitches the stages together so callers can fingerprint a file
//! or a whole codebase with a single call:
//!
//! - [`fingerprint_file`]: regular-file and text guards, strict UTF-8 read,
//!   then `halo1` / `chunks_halo1` for the file.
//! - [`fingerprint_codebase`]: every file of a [`Codebase`], then every
//!   directory, bottom-up.

pub mod config;

pub use canonical::{is_token_char, ngrams, tokenize};
pub use directory::{
    Codebase, DirectoryConfig, DirectoryError, DirectoryFailure, DirectoryFingerprints,
    DirectoryReport, FingerprintKind, FingerprintSchema, Resource, ResourceId, ResourceKind,
    ResourceSink, WalkOrder, compute_codebase_directory_fingerprints,
    compute_codebase_directory_fingerprints_with, compute_directory_fingerprints,
    compute_directory_fingerprints_with,
};
pub use ingest::{
    Classification, ContentClassifier, HeuristicClassifier, IngestConfig, IngestError, TextFile,
    is_regular_file, read_text, read_text_with,
};
pub use perceptual::{
    BitAverageHaloHash, CodecError, DirectoryFingerprint, FileFingerprint,
    IGNORED_DIRECTORY_FINGERPRINTS, PerceptualConfig, PerceptualError, decode_fingerprint,
    encode_fingerprint, fingerprint_text, fingerprint_tokens, is_ignored_fingerprint,
    select_windows, to_binary_chunks,
};

pub use crate::config::{ConfigLoadError, HalofpConfig};

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde_json::Value;
use tracing::{Level, info, warn};

/// `extra_data` key of a file's whole-file halo hash.
pub const HALO1_KEY: &str = "halo1";

/// `extra_data` key of a file's per-chunk halo hashes.
pub const CHUNKS_HALO1_KEY: &str = "chunks_halo1";

/// Errors that can occur while fingerprinting a file or a codebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Ingest(IngestError),
    Perceptual(PerceptualError),
    Directory(DirectoryError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "content read failure: {err}"),
            PipelineError::Perceptual(err) => write!(f, "file fingerprinting failed: {err}"),
            PipelineError::Directory(err) => write!(f, "directory fingerprinting failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
            PipelineError::Perceptual(err) => Some(err),
            PipelineError::Directory(err) => Some(err),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

impl From<PerceptualError> for PipelineError {
    fn from(value: PerceptualError) -> Self {
        PipelineError::Perceptual(value)
    }
}

impl From<DirectoryError> for PipelineError {
    fn from(value: DirectoryError) -> Self {
        PipelineError::Directory(value)
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    /// One call per [`fingerprint_file`]. Skipped files report `Ok(false)`.
    fn record_file(&self, latency: Duration, result: Result<bool, PipelineError>);
    /// One call per directory pass of [`fingerprint_codebase`].
    fn record_directories(&self, latency: Duration, report: &DirectoryReport);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_file(self, result: Result<bool, PipelineError>) {
        self.recorder.record_file(self.start.elapsed(), result);
    }

    fn record_directories(self, report: &DirectoryReport) {
        self.recorder
            .record_directories(self.start.elapsed(), report);
    }
}

/// Fingerprint the file at `path` with the default ingest configuration.
///
/// `Ok(None)` when `path` is not a regular file or does not hold text.
pub fn fingerprint_file(
    path: &Path,
    perceptual_cfg: &PerceptualConfig,
) -> Result<Option<FileFingerprint>, PipelineError> {
    fingerprint_file_with_configs(path, &IngestConfig::default(), perceptual_cfg)
}

/// Fingerprint the file at `path` with explicit configuration for every
/// stage.
pub fn fingerprint_file_with_configs(
    path: &Path,
    ingest_cfg: &IngestConfig,
    perceptual_cfg: &PerceptualConfig,
) -> Result<Option<FileFingerprint>, PipelineError> {
    let metrics = MetricsSpan::start();
    let result = fingerprint_file_inner(path, ingest_cfg, perceptual_cfg);
    if let Some(span) = metrics {
        span.record_file(match &result {
            Ok(fp) => Ok(fp.is_some()),
            Err(err) => Err(err.clone()),
        });
    }
    result
}

fn fingerprint_file_inner(
    path: &Path,
    ingest_cfg: &IngestConfig,
    perceptual_cfg: &PerceptualConfig,
) -> Result<Option<FileFingerprint>, PipelineError> {
    let Some(file) = read_text(path, ingest_cfg)? else {
        return Ok(None);
    };
    let fingerprint = fingerprint_text(&file.text, perceptual_cfg)?;
    Ok(Some(fingerprint))
}

/// A file whose fingerprint could not be computed or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: String,
    pub error: PipelineError,
}

/// Outcome of [`fingerprint_codebase`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodebaseReport {
    /// Files that got `halo1` / `chunks_halo1`.
    pub files_fingerprinted: usize,
    /// Files without a location, non-regular or non-text.
    pub files_skipped: usize,
    pub file_failures: Vec<FileFailure>,
    /// Disk entries left out while loading the tree.
    pub scan_failures: Vec<DirectoryFailure>,
    pub directories: DirectoryReport,
}

impl CodebaseReport {
    pub fn is_success(&self) -> bool {
        self.file_failures.is_empty()
            && self.scan_failures.is_empty()
            && self.directories.is_success()
    }
}

/// Fingerprint every file of `codebase`, then every directory, bottom-up.
///
/// File fingerprints are stored in `extra_data` under [`HALO1_KEY`] and
/// [`CHUNKS_HALO1_KEY`] and committed with [`Codebase::save`]. Only files
/// loaded from disk (with a `location`) are read. A failing resource is
/// recorded in the report and the run moves on.
pub fn fingerprint_codebase(codebase: &mut Codebase, cfg: &HalofpConfig) -> CodebaseReport {
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "halofp.fingerprint_codebase", resources = codebase.len());
    let _guard = span.enter();

    let ingest_cfg = cfg.ingest_config();
    let perceptual_cfg = cfg.perceptual_config();
    let directory_cfg = cfg.directory_config();

    let files: Vec<(ResourceId, std::path::PathBuf)> = codebase
        .iter()
        .filter(|res| res.is_file())
        .filter_map(|res| res.location.clone().map(|location| (res.id(), location)))
        .collect();

    let fingerprint = |(id, location): &(ResourceId, std::path::PathBuf)| {
        (
            *id,
            fingerprint_file_with_configs(location, &ingest_cfg, &perceptual_cfg),
        )
    };
    let computed: Vec<_> = if directory_cfg.use_parallel {
        files.par_iter().map(fingerprint).collect()
    } else {
        files.iter().map(fingerprint).collect()
    };

    let mut report = CodebaseReport {
        files_skipped: codebase.iter().filter(|res| res.is_file()).count() - files.len(),
        scan_failures: codebase.scan_failures().to_vec(),
        ..CodebaseReport::default()
    };

    for (id, outcome) in computed {
        let path = codebase
            .get(id)
            .map(|res| res.path.clone())
            .unwrap_or_default();
        match outcome.and_then(|fp| store_file_fingerprint(codebase, id, fp)) {
            Ok(true) => report.files_fingerprinted += 1,
            Ok(false) => report.files_skipped += 1,
            Err(error) => {
                warn!(path = %path, error = %error, "file_fingerprint_failure");
                report.file_failures.push(FileFailure { path, error });
            }
        }
    }

    let metrics = MetricsSpan::start();
    report.directories = compute_codebase_directory_fingerprints_with(codebase, &directory_cfg);
    if let Some(span) = metrics {
        span.record_directories(&report.directories);
    }

    let elapsed_micros = start.elapsed().as_micros();
    info!(
        files_fingerprinted = report.files_fingerprinted,
        files_skipped = report.files_skipped,
        file_failures = report.file_failures.len(),
        scan_failures = report.scan_failures.len(),
        directories_fingerprinted = report.directories.fingerprinted,
        elapsed_micros,
        "codebase_fingerprint_success"
    );
    report
}

fn store_file_fingerprint(
    codebase: &mut Codebase,
    id: ResourceId,
    fingerprint: Option<FileFingerprint>,
) -> Result<bool, PipelineError> {
    let Some(fingerprint) = fingerprint else {
        return Ok(false);
    };
    let resource = codebase.get_mut(id)?;
    resource
        .extra_data
        .insert(HALO1_KEY.to_string(), Value::String(fingerprint.halo1));
    resource.extra_data.insert(
        CHUNKS_HALO1_KEY.to_string(),
        Value::Array(
            fingerprint
                .chunks_halo1
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
    );
    codebase.save(id)?;
    Ok(true)
}

/// Scan `root` from disk and fingerprint it.
pub fn fingerprint_path(
    root: &Path,
    cfg: &HalofpConfig,
) -> Result<(Codebase, CodebaseReport), PipelineError> {
    let mut codebase = Codebase::from_path(root, cfg.schema())?;
    let report = fingerprint_codebase(&mut codebase, cfg);
    Ok((codebase, report))
}
