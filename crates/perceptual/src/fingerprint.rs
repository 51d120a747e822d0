//! File fingerprint output type.
//!
//! Field names are part of the public contract: stored scan results and
//! other producers use `halo1` and `chunks_halo1` verbatim.

use serde::{Deserialize, Serialize};

/// Whole-file and per-chunk halo hashes of one text file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Halo hash over every n-gram of the file. Empty when the file has no
    /// n-gram (fewer tokens than the n-gram length).
    pub halo1: String,
    /// Halo hash of each window kept by the hailstorm selector, in file order.
    pub chunks_halo1: Vec<String>,
}

impl FileFingerprint {
    /// True when the file produced no signal at all.
    pub fn is_empty(&self) -> bool {
        self.halo1.is_empty() && self.chunks_halo1.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let fp = FileFingerprint::default();
        assert!(fp.is_empty());
        assert_eq!(fp.halo1, "");
    }

    #[test]
    fn serde_field_names() {
        let fp = FileFingerprint {
            halo1: "ab".repeat(16),
            chunks_halo1: vec!["cd".repeat(16)],
        };
        let value = serde_json::to_value(&fp).unwrap();
        assert_eq!(value["halo1"], "ab".repeat(16));
        assert_eq!(value["chunks_halo1"][0], "cd".repeat(16));

        let back: FileFingerprint = serde_json::from_value(value).unwrap();
        assert_eq!(back, fp);
    }
}
