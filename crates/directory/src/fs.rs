//! Build a [`Codebase`] from a directory on disk.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::{debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::codebase::Codebase;
use crate::engine::DirectoryFailure;
use crate::error::DirectoryError;
use crate::resource::{FingerprintSchema, ResourceId};

impl Codebase {
    /// Scan `root` into a codebase.
    ///
    /// Resource paths start with the name of `root`. Entries are sorted by
    /// file name, symlinks are not followed and neither they nor special
    /// files become resources. Non-empty files get their `sha1`.
    ///
    /// Only a missing or non-directory `root` is an error. An entry that
    /// cannot be read or added is left out, together with anything below
    /// it, and listed in [`Codebase::scan_failures`] under its disk path.
    #[instrument(level = "info", name = "directory.scan", skip_all, fields(root = %root.display()), err)]
    pub fn from_path(root: &Path, schema: FingerprintSchema) -> Result<Self, DirectoryError> {
        let meta = std::fs::metadata(root).map_err(|err| DirectoryError::io(root, err))?;
        if !meta.is_dir() {
            return Err(DirectoryError::NotADirectory {
                path: root.display().to_string(),
            });
        }

        let mut codebase = Codebase::new(root_name(root), schema);
        let mut dirs: HashMap<PathBuf, ResourceId> = HashMap::new();
        dirs.insert(root.to_path_buf(), codebase.root());

        let entries = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    skip_entry(&mut codebase, &path, DirectoryError::io(&path, err));
                    continue;
                }
            };
            let Some(&parent) = entry.path().parent().and_then(|p| dirs.get(p)) else {
                continue;
            };
            match add_entry(&mut codebase, parent, &entry) {
                Ok(Some(id)) => {
                    dirs.insert(entry.path().to_path_buf(), id);
                }
                Ok(None) => {}
                Err(err) => skip_entry(&mut codebase, entry.path(), err),
            }
        }

        codebase.get_mut(codebase.root())?.location = Some(root.to_path_buf());
        debug!(
            resources = codebase.len(),
            failures = codebase.scan_failures().len(),
            "scan_complete"
        );
        Ok(codebase)
    }
}

/// Add one walked entry under `parent`. Returns the id of a new directory.
fn add_entry(
    codebase: &mut Codebase,
    parent: ResourceId,
    entry: &DirEntry,
) -> Result<Option<ResourceId>, DirectoryError> {
    let file_type = entry.file_type();
    let name = entry.file_name().to_string_lossy();

    if file_type.is_dir() {
        let id = codebase.add_directory(parent, &name)?;
        codebase.get_mut(id)?.location = Some(entry.path().to_path_buf());
        Ok(Some(id))
    } else if file_type.is_file() {
        let size = entry
            .metadata()
            .map_err(|err| DirectoryError::io(entry.path(), err))?
            .len();
        let sha1 = if size > 0 {
            Some(sha1_file(entry.path())?)
        } else {
            None
        };
        let id = codebase.add_file(parent, &name, Some(size), sha1)?;
        codebase.get_mut(id)?.location = Some(entry.path().to_path_buf());
        Ok(None)
    } else {
        debug!(path = %entry.path().display(), "scan_skip_special_file");
        Ok(None)
    }
}

fn skip_entry(codebase: &mut Codebase, path: &Path, error: DirectoryError) {
    warn!(path = %path.display(), error = %error, "scan_entry_failure");
    codebase.record_scan_failure(DirectoryFailure {
        path: path.display().to_string(),
        error,
    });
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(root)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_default()
}

/// Lowercase hex SHA-1 of a file's bytes.
pub fn sha1_file(path: &Path) -> Result<String, DirectoryError> {
    let mut file = File::open(path).map_err(|err| DirectoryError::io(path, err))?;
    let mut hasher = Sha1::new();
    io::copy(&mut file, &mut hasher).map_err(|err| DirectoryError::io(path, err))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scans_sorted_tree_with_hashes() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/b.c"), "b").unwrap();
        fs::write(root.join("src/a.c"), "hello").unwrap();
        fs::write(root.join("empty.txt"), "").unwrap();

        let cb = Codebase::from_path(&root, FingerprintSchema::Dedicated).unwrap();
        let paths: Vec<&str> = cb.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            ["proj", "proj/empty.txt", "proj/src", "proj/src/a.c", "proj/src/b.c"]
        );

        let a = cb.resource_by_path("proj/src/a.c").unwrap();
        assert_eq!(a.size, Some(5));
        assert_eq!(
            a.sha1.as_deref(),
            Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
        );
        assert_eq!(a.location.as_deref(), Some(root.join("src/a.c").as_path()));

        let empty = cb.resource_by_path("proj/empty.txt").unwrap();
        assert_eq!(empty.size, Some(0));
        assert_eq!(empty.sha1, None);
    }

    #[test]
    fn rejects_files_and_missing_roots() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            Codebase::from_path(&file, FingerprintSchema::Dedicated),
            Err(DirectoryError::NotADirectory { .. })
        ));
        assert!(matches!(
            Codebase::from_path(&tmp.path().join("missing"), FingerprintSchema::Dedicated),
            Err(DirectoryError::Io { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_resources() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        let cb = Codebase::from_path(&root, FingerprintSchema::Dedicated).unwrap();
        assert!(cb.resource_by_path("proj/real.txt").is_some());
        assert!(cb.resource_by_path("proj/link.txt").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn colliding_names_are_skipped_not_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir(&root).unwrap();
        // Both names decode lossily to "a\u{FFFD}".
        fs::write(root.join(OsStr::from_bytes(b"a\xfe")), "one").unwrap();
        fs::write(root.join(OsStr::from_bytes(b"a\xff")), "two").unwrap();
        fs::create_dir(root.join("b")).unwrap();
        fs::write(root.join("b/c.txt"), "three").unwrap();

        let cb = Codebase::from_path(&root, FingerprintSchema::Dedicated).unwrap();
        assert!(cb.resource_by_path("proj/a\u{FFFD}").is_some());
        assert!(cb.resource_by_path("proj/b/c.txt").is_some());

        let failures = cb.scan_failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0].error,
            DirectoryError::DuplicatePath { ref path } if path == "proj/a\u{FFFD}"
        ));
        assert_eq!(failures[0].path, root.join(OsStr::from_bytes(b"a\xff")).display().to_string());
    }

    #[test]
    fn clean_scan_has_no_failures() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();

        let cb = Codebase::from_path(&root, FingerprintSchema::Dedicated).unwrap();
        assert!(cb.scan_failures().is_empty());
    }
}
