use serde::{Deserialize, Serialize};

/// Digest width of directory fingerprints. The codec only carries 128-bit
/// digests, so this is not configurable.
pub const DIRECTORY_DIGEST_BITS: usize = 128;

/// Runtime configuration for the directory fingerprint engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Compute fingerprints on the rayon pool. Results are committed in
    /// post-order on the calling thread either way.
    pub use_parallel: bool,
}

impl DirectoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }
}
