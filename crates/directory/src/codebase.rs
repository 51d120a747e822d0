//! Codebase arena.
//!
//! Resources are owned by the [`Codebase`] and addressed by [`ResourceId`].
//! The tree shape is fixed once built: fingerprinting only mutates
//! fingerprint fields and commits them through [`Codebase::save`].

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use crate::engine::DirectoryFailure;
use crate::error::DirectoryError;
use crate::resource::{FingerprintKind, FingerprintSchema, Resource, ResourceId, ResourceKind};

/// Traversal order of [`Codebase::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkOrder {
    /// Pre-order: a directory before its children.
    TopDown,
    /// Post-order: every child, recursively, before its directory.
    BottomUp,
}

/// Persists committed resources.
pub trait ResourceSink: Send + Sync {
    fn save(&self, resource: &Resource) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

/// A tree of resources rooted at a single directory.
pub struct Codebase {
    resources: Vec<Resource>,
    by_path: HashMap<String, ResourceId>,
    schema: FingerprintSchema,
    sink: Option<Box<dyn ResourceSink>>,
    saves: usize,
    scan_failures: Vec<DirectoryFailure>,
}

impl fmt::Debug for Codebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codebase")
            .field("resources", &self.resources.len())
            .field("schema", &self.schema)
            .field("has_sink", &self.sink.is_some())
            .field("saves", &self.saves)
            .field("scan_failures", &self.scan_failures.len())
            .finish()
    }
}

impl Codebase {
    /// Create a codebase holding only its root directory.
    ///
    /// An empty `root_path` makes a synthetic root: whole-codebase runs never
    /// fingerprint it.
    pub fn new(root_path: impl Into<String>, schema: FingerprintSchema) -> Self {
        let root_path = root_path.into().trim_matches('/').to_string();
        let root = Resource::new(ResourceId(0), None, root_path.clone(), ResourceKind::Directory);
        let mut by_path = HashMap::new();
        by_path.insert(root_path, ResourceId(0));
        Self {
            resources: vec![root],
            by_path,
            schema,
            sink: None,
            saves: 0,
            scan_failures: Vec::new(),
        }
    }

    /// Route [`Codebase::save`] to `sink`.
    pub fn with_sink(mut self, sink: impl ResourceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn schema(&self) -> FingerprintSchema {
        self.schema
    }

    pub fn root(&self) -> ResourceId {
        ResourceId(0)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Always false: a codebase has at least its root.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Disk entries [`Codebase::from_path`] could not load. Their siblings
    /// were loaded regardless.
    pub fn scan_failures(&self) -> &[DirectoryFailure] {
        &self.scan_failures
    }

    pub(crate) fn record_scan_failure(&mut self, failure: DirectoryFailure) {
        self.scan_failures.push(failure);
    }

    pub fn get(&self, id: ResourceId) -> Result<&Resource, DirectoryError> {
        self.resources
            .get(id.0)
            .ok_or(DirectoryError::UnknownResource(id))
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Result<&mut Resource, DirectoryError> {
        self.resources
            .get_mut(id.0)
            .ok_or(DirectoryError::UnknownResource(id))
    }

    pub fn id_of(&self, path: &str) -> Option<ResourceId> {
        self.by_path.get(path).copied()
    }

    pub fn resource_by_path(&self, path: &str) -> Option<&Resource> {
        self.id_of(path).and_then(|id| self.resources.get(id.0))
    }

    /// Every resource in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn add_directory(
        &mut self,
        parent: ResourceId,
        name: &str,
    ) -> Result<ResourceId, DirectoryError> {
        self.add(parent, name, ResourceKind::Directory)
    }

    pub fn add_file(
        &mut self,
        parent: ResourceId,
        name: &str,
        size: Option<u64>,
        sha1: Option<String>,
    ) -> Result<ResourceId, DirectoryError> {
        let id = self.add(parent, name, ResourceKind::File)?;
        let file = &mut self.resources[id.0];
        file.size = size;
        file.sha1 = sha1;
        Ok(id)
    }

    fn add(
        &mut self,
        parent: ResourceId,
        name: &str,
        kind: ResourceKind,
    ) -> Result<ResourceId, DirectoryError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(DirectoryError::InvalidName {
                name: name.to_string(),
            });
        }
        let parent_res = self.get(parent)?;
        if !parent_res.is_dir() {
            return Err(DirectoryError::NotADirectory {
                path: parent_res.path.clone(),
            });
        }
        let path = if parent_res.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_res.path, name)
        };
        if self.by_path.contains_key(&path) {
            return Err(DirectoryError::DuplicatePath { path });
        }

        let id = ResourceId(self.resources.len());
        self.resources
            .push(Resource::new(id, Some(parent), path.clone(), kind));
        self.resources[parent.0].children.push(id);
        self.by_path.insert(path, id);
        Ok(id)
    }

    /// Every descendant of `id` in `order`, excluding `id` itself.
    pub fn walk(&self, id: ResourceId, order: WalkOrder) -> Result<Vec<ResourceId>, DirectoryError> {
        let start = self.get(id)?;
        let mut out = Vec::new();
        match order {
            WalkOrder::TopDown => {
                let mut stack: Vec<ResourceId> = start.children.iter().rev().copied().collect();
                while let Some(next) = stack.pop() {
                    out.push(next);
                    stack.extend(self.resources[next.0].children.iter().rev());
                }
            }
            WalkOrder::BottomUp => {
                // Reverse of a right-to-left pre-order.
                let mut stack: Vec<ResourceId> = start.children.clone();
                while let Some(next) = stack.pop() {
                    out.push(next);
                    stack.extend(self.resources[next.0].children.iter());
                }
                out.reverse();
            }
        }
        Ok(out)
    }

    /// Every resource of the codebase in `order`, root included.
    pub fn walk_codebase(&self, order: WalkOrder) -> Vec<ResourceId> {
        let root = self.root();
        let mut out = Vec::with_capacity(self.resources.len());
        if order == WalkOrder::TopDown {
            out.push(root);
        }
        // The root always exists.
        out.extend(self.walk(root, order).unwrap_or_default());
        if order == WalkOrder::BottomUp {
            out.push(root);
        }
        out
    }

    /// Read a directory fingerprint through the codebase schema.
    pub fn fingerprint(&self, id: ResourceId, kind: FingerprintKind) -> Option<&str> {
        self.resources
            .get(id.0)
            .and_then(|res| res.fingerprint(self.schema, kind))
    }

    /// Write a directory fingerprint through the codebase schema. Not saved
    /// until [`Codebase::save`].
    pub fn set_fingerprint(
        &mut self,
        id: ResourceId,
        kind: FingerprintKind,
        fingerprint: String,
    ) -> Result<(), DirectoryError> {
        let schema = self.schema;
        self.get_mut(id)?.set_fingerprint(schema, kind, fingerprint);
        Ok(())
    }

    /// Commit the current state of `id`.
    pub fn save(&mut self, id: ResourceId) -> Result<(), DirectoryError> {
        let resource = self.get(id)?;
        if let Some(sink) = &self.sink {
            sink.save(resource).map_err(|err| DirectoryError::Save {
                path: resource.path.clone(),
                message: err.to_string(),
            })?;
        }
        self.saves += 1;
        Ok(())
    }
}
