//! # halofp directory fingerprints
//!
//! A [`Codebase`] is an arena of [`Resource`]s (files and directories) built
//! either by hand or from disk with [`Codebase::from_path`]. The engine
//! walks it bottom-up and gives every directory with at least two non-empty
//! files a content and a structure fingerprint, stored according to the
//! codebase's [`FingerprintSchema`] and committed with [`Codebase::save`].
//!
//! ```
//! use directory::{compute_codebase_directory_fingerprints, Codebase, FingerprintKind, FingerprintSchema};
//!
//! let mut codebase = Codebase::new("zlib", FingerprintSchema::Dedicated);
//! let root = codebase.root();
//! let src = codebase.add_directory(root, "src").unwrap();
//! codebase.add_file(src, "inflate.c", Some(15), Some("a".repeat(40))).unwrap();
//! codebase.add_file(src, "deflate.c", Some(27), Some("b".repeat(40))).unwrap();
//!
//! let report = compute_codebase_directory_fingerprints(&mut codebase);
//! assert_eq!(report.fingerprinted, 2);
//!
//! let content = codebase.fingerprint(src, FingerprintKind::Content).unwrap();
//! assert!(content.starts_with("00000002"));
//! ```

mod codebase;
mod config;
mod engine;
mod error;
mod fs;
mod resource;

pub use crate::codebase::{Codebase, ResourceSink, WalkOrder};
pub use crate::config::{DirectoryConfig, DIRECTORY_DIGEST_BITS};
pub use crate::engine::{
    compute_codebase_directory_fingerprints, compute_codebase_directory_fingerprints_with,
    compute_directory_fingerprints, compute_directory_fingerprints_with,
    create_content_fingerprint, create_directory_fingerprint, create_structure_fingerprint,
    directory_fingerprints, eligible_files, resource_subpath, rounded_size, DirectoryFailure,
    DirectoryFingerprints, DirectoryReport,
};
pub use crate::error::DirectoryError;
pub use crate::fs::sha1_file;
pub use crate::resource::{
    FingerprintKind, FingerprintSchema, Resource, ResourceId, ResourceKind, DIRECTORY_CONTENT_KEY,
    DIRECTORY_STRUCTURE_KEY,
};
