//! Directory fingerprint engine.
//!
//! Each directory with at least two non-empty descendant files gets two
//! fingerprints:
//!
//! - **content**: halo hash of the `sha1` of every such file.
//! - **structure**: halo hash of `<size rounded down to 10><subpath>` for
//!   every such file, where `subpath` is relative to the directory.
//!
//! Both are encoded with [`perceptual::encode_fingerprint`], so the first
//! 8 hex digits carry the number of hashed features. Directories are
//! processed bottom-up.

use std::time::Instant;

use perceptual::{encode_fingerprint, BitAverageHaloHash};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn, Level};

use crate::codebase::{Codebase, WalkOrder};
use crate::config::{DirectoryConfig, DIRECTORY_DIGEST_BITS};
use crate::error::DirectoryError;
use crate::resource::{FingerprintKind, ResourceId};

/// Both fingerprints of one directory, encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryFingerprints {
    pub content: String,
    pub structure: String,
}

/// A directory whose fingerprints could not be computed or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryFailure {
    pub path: String,
    pub error: DirectoryError,
}

/// Outcome of a fingerprinting run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    /// Directories considered.
    pub visited: usize,
    /// Directories that got both fingerprints and were saved.
    pub fingerprinted: usize,
    /// Directories with one or no non-empty file.
    pub skipped: usize,
    pub failures: Vec<DirectoryFailure>,
}

impl DirectoryReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Hash non-empty `features` into an encoded directory fingerprint.
pub fn create_directory_fingerprint<I, S>(features: I) -> Result<String, DirectoryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut halo = BitAverageHaloHash::new(DIRECTORY_DIGEST_BITS)?;
    for feature in features {
        let feature = feature.as_ref();
        if !feature.is_empty() {
            halo.update(feature.as_bytes());
        }
    }
    // A u32 count covers any realistic directory.
    let count = u32::try_from(halo.elements_count()).unwrap_or(u32::MAX);
    Ok(encode_fingerprint(count, &halo.hexdigest())?)
}

/// Non-empty files below `directory` at any depth, in pre-order.
pub fn eligible_files(
    codebase: &Codebase,
    directory: ResourceId,
) -> Result<Vec<ResourceId>, DirectoryError> {
    let mut files = Vec::new();
    for id in codebase.walk(directory, WalkOrder::TopDown)? {
        if codebase.get(id)?.has_content() {
            files.push(id);
        }
    }
    Ok(files)
}

/// Content fingerprint over the `sha1` of `files`. Missing hashes are
/// ignored.
pub fn create_content_fingerprint(
    codebase: &Codebase,
    files: &[ResourceId],
) -> Result<String, DirectoryError> {
    let mut features = Vec::with_capacity(files.len());
    for &id in files {
        if let Some(sha1) = codebase.get(id)?.sha1.as_deref() {
            features.push(sha1);
        }
    }
    create_directory_fingerprint(features)
}

/// `path` relative to `top`: everything after the first occurrence of
/// `top`, without leading slashes. Empty when `top` does not occur.
pub fn resource_subpath<'a>(path: &'a str, top: &str) -> &'a str {
    match path.split_once(top) {
        Some((_, rest)) => rest.trim_start_matches('/'),
        None => "",
    }
}

/// Size floored to a multiple of ten. Unknown sizes count as zero.
pub fn rounded_size(size: Option<u64>) -> u64 {
    size.map_or(0, |size| size / 10 * 10)
}

/// Structure fingerprint of `directory` over `files`.
pub fn create_structure_fingerprint(
    codebase: &Codebase,
    directory: ResourceId,
    files: &[ResourceId],
) -> Result<String, DirectoryError> {
    let top = codebase.get(directory)?;
    let mut features = Vec::with_capacity(files.len());
    for &id in files {
        let file = codebase.get(id)?;
        if file.path.is_empty() {
            continue;
        }
        let subpath = resource_subpath(&file.path, &top.path);
        if subpath.is_empty() {
            continue;
        }
        features.push(format!("{}{}", rounded_size(file.size), subpath));
    }
    create_directory_fingerprint(features)
}

/// Compute the fingerprints of one directory without touching the codebase.
///
/// `Ok(None)` when the directory has one or no non-empty file.
pub fn directory_fingerprints(
    codebase: &Codebase,
    directory: ResourceId,
) -> Result<Option<DirectoryFingerprints>, DirectoryError> {
    let resource = codebase.get(directory)?;
    if !resource.is_dir() {
        return Err(DirectoryError::NotADirectory {
            path: resource.path.clone(),
        });
    }

    let files = eligible_files(codebase, directory)?;
    if files.len() <= 1 {
        return Ok(None);
    }

    Ok(Some(DirectoryFingerprints {
        content: create_content_fingerprint(codebase, &files)?,
        structure: create_structure_fingerprint(codebase, directory, &files)?,
    }))
}

/// Fingerprint every directory below `directory`, bottom-up.
///
/// `directory` itself is not fingerprinted; its parent run or
/// [`compute_codebase_directory_fingerprints`] covers it.
pub fn compute_directory_fingerprints(
    codebase: &mut Codebase,
    directory: ResourceId,
) -> Result<DirectoryReport, DirectoryError> {
    compute_directory_fingerprints_with(codebase, directory, &DirectoryConfig::default())
}

/// [`compute_directory_fingerprints`] with an explicit configuration.
pub fn compute_directory_fingerprints_with(
    codebase: &mut Codebase,
    directory: ResourceId,
    cfg: &DirectoryConfig,
) -> Result<DirectoryReport, DirectoryError> {
    let start = codebase.get(directory)?;
    if !start.is_dir() {
        return Err(DirectoryError::NotADirectory {
            path: start.path.clone(),
        });
    }
    let start_path = start.path.clone();

    let mut targets = Vec::new();
    for id in codebase.walk(directory, WalkOrder::BottomUp)? {
        if codebase.get(id)?.is_dir() {
            targets.push(id);
        }
    }

    Ok(run(codebase, &targets, &start_path, cfg))
}

/// Fingerprint every directory of the codebase, bottom-up. A root with an
/// empty path is synthetic and left alone.
pub fn compute_codebase_directory_fingerprints(codebase: &mut Codebase) -> DirectoryReport {
    compute_codebase_directory_fingerprints_with(codebase, &DirectoryConfig::default())
}

/// [`compute_codebase_directory_fingerprints`] with an explicit
/// configuration.
pub fn compute_codebase_directory_fingerprints_with(
    codebase: &mut Codebase,
    cfg: &DirectoryConfig,
) -> DirectoryReport {
    let targets: Vec<ResourceId> = codebase
        .walk_codebase(WalkOrder::BottomUp)
        .into_iter()
        .filter(|&id| {
            codebase
                .get(id)
                .map(|res| res.is_dir() && !res.path.is_empty())
                .unwrap_or(false)
        })
        .collect();
    let root_path = codebase
        .get(codebase.root())
        .map(|res| res.path.clone())
        .unwrap_or_default();

    run(codebase, &targets, &root_path, cfg)
}

/// Compute for `targets` (already in post-order), then commit in order.
fn run(
    codebase: &mut Codebase,
    targets: &[ResourceId],
    root_path: &str,
    cfg: &DirectoryConfig,
) -> DirectoryReport {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "directory.compute",
        root = %root_path,
        directories = targets.len(),
        parallel = cfg.use_parallel
    );
    let _guard = span.enter();

    let computed: Vec<Result<Option<DirectoryFingerprints>, DirectoryError>> = {
        let shared: &Codebase = codebase;
        if cfg.use_parallel {
            targets
                .par_iter()
                .map(|&id| directory_fingerprints(shared, id))
                .collect()
        } else {
            targets
                .iter()
                .map(|&id| directory_fingerprints(shared, id))
                .collect()
        }
    };

    let mut report = DirectoryReport {
        visited: targets.len(),
        ..DirectoryReport::default()
    };

    for (&id, outcome) in targets.iter().zip(computed) {
        let path = codebase
            .get(id)
            .map(|res| res.path.clone())
            .unwrap_or_default();
        match outcome.and_then(|fingerprints| commit(codebase, id, fingerprints)) {
            Ok(true) => report.fingerprinted += 1,
            Ok(false) => {
                debug!(path = %path, "directory_fingerprint_skipped");
                report.skipped += 1;
            }
            Err(error) => {
                warn!(path = %path, error = %error, "directory_fingerprint_failure");
                report.failures.push(DirectoryFailure { path, error });
            }
        }
    }

    let elapsed_micros = start.elapsed().as_micros();
    info!(
        visited = report.visited,
        fingerprinted = report.fingerprinted,
        skipped = report.skipped,
        failed = report.failures.len(),
        elapsed_micros,
        "directory_fingerprint_success"
    );
    report
}

fn commit(
    codebase: &mut Codebase,
    id: ResourceId,
    fingerprints: Option<DirectoryFingerprints>,
) -> Result<bool, DirectoryError> {
    let Some(fingerprints) = fingerprints else {
        return Ok(false);
    };
    codebase.set_fingerprint(id, FingerprintKind::Content, fingerprints.content)?;
    codebase.set_fingerprint(id, FingerprintKind::Structure, fingerprints.structure)?;
    codebase.save(id)?;
    Ok(true)
}
