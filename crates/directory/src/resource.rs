//! Resource model.
//!
//! A [`Resource`] is one file or directory of a codebase. Paths are
//! `/`-separated and relative to the scan, for example `zlib/src/inflate.c`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `extra_data` key of the content fingerprint.
pub const DIRECTORY_CONTENT_KEY: &str = "directory_content";

/// `extra_data` key of the structure fingerprint.
pub const DIRECTORY_STRUCTURE_KEY: &str = "directory_structure";

/// Index of a resource in its [`Codebase`](crate::Codebase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    File,
    Directory,
}

/// Where directory fingerprints live on a resource.
///
/// Decided once for the whole codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintSchema {
    /// `directory_content_fingerprint` / `directory_structure_fingerprint`.
    #[default]
    Dedicated,
    /// [`DIRECTORY_CONTENT_KEY`] / [`DIRECTORY_STRUCTURE_KEY`] in `extra_data`.
    ExtraData,
}

/// The two directory fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintKind {
    Content,
    Structure,
}

impl FingerprintKind {
    pub fn extra_data_key(self) -> &'static str {
        match self {
            FingerprintKind::Content => DIRECTORY_CONTENT_KEY,
            FingerprintKind::Structure => DIRECTORY_STRUCTURE_KEY,
        }
    }
}

/// One file or directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub(crate) id: ResourceId,
    #[serde(skip)]
    pub(crate) parent: Option<ResourceId>,
    #[serde(skip)]
    pub(crate) children: Vec<ResourceId>,
    pub path: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// On-disk location for resources loaded from a filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_content_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_structure_fingerprint: Option<String>,
}

impl Resource {
    pub(crate) fn new(
        id: ResourceId,
        parent: Option<ResourceId>,
        path: String,
        kind: ResourceKind,
    ) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            path,
            kind,
            size: None,
            sha1: None,
            location: None,
            extra_data: Map::new(),
            directory_content_fingerprint: None,
            directory_structure_fingerprint: None,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn parent(&self) -> Option<ResourceId> {
        self.parent
    }

    pub fn children(&self) -> &[ResourceId] {
        &self.children
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ResourceKind::Directory
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// A file with a known, non-zero size.
    pub fn has_content(&self) -> bool {
        self.is_file() && self.size.unwrap_or(0) > 0
    }

    /// Read one directory fingerprint through `schema`.
    pub fn fingerprint(&self, schema: FingerprintSchema, kind: FingerprintKind) -> Option<&str> {
        match schema {
            FingerprintSchema::Dedicated => match kind {
                FingerprintKind::Content => self.directory_content_fingerprint.as_deref(),
                FingerprintKind::Structure => self.directory_structure_fingerprint.as_deref(),
            },
            FingerprintSchema::ExtraData => self
                .extra_data
                .get(kind.extra_data_key())
                .and_then(Value::as_str),
        }
    }

    /// Write one directory fingerprint through `schema`.
    pub fn set_fingerprint(
        &mut self,
        schema: FingerprintSchema,
        kind: FingerprintKind,
        fingerprint: String,
    ) {
        match schema {
            FingerprintSchema::Dedicated => match kind {
                FingerprintKind::Content => self.directory_content_fingerprint = Some(fingerprint),
                FingerprintKind::Structure => {
                    self.directory_structure_fingerprint = Some(fingerprint)
                }
            },
            FingerprintSchema::ExtraData => {
                self.extra_data
                    .insert(kind.extra_data_key().to_string(), Value::String(fingerprint));
            }
        }
    }
}
