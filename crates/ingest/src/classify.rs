//! File type detection.
//!
//! Only regular files whose content looks like text are fingerprinted. The
//! decision sits behind [`ContentClassifier`] so callers with a better
//! detector (libmagic, a MIME database) can plug it in.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::config::IngestConfig;
use crate::error::IngestError;

/// Outcome of classifying one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_text: bool,
    pub is_binary: bool,
    pub is_empty: bool,
}

impl Classification {
    pub const EMPTY: Self = Self {
        is_text: true,
        is_binary: false,
        is_empty: true,
    };
    pub const TEXT: Self = Self {
        is_text: true,
        is_binary: false,
        is_empty: false,
    };
    pub const BINARY: Self = Self {
        is_text: false,
        is_binary: true,
        is_empty: false,
    };
}

/// Decides whether a file holds text.
pub trait ContentClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> Result<Classification, IngestError>;
}

/// True for a regular file. Symlinks, directories, sockets and missing
/// paths are not.
pub fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_file())
        .unwrap_or(false)
}

/// Sniffs the head of a file: binary when it holds a NUL byte or when more
/// than 30% of the bytes are control characters other than common
/// whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicClassifier {
    sniff_bytes: usize,
}

impl HeuristicClassifier {
    pub fn new(sniff_bytes: usize) -> Self {
        Self { sniff_bytes }
    }

    pub fn from_config(cfg: &IngestConfig) -> Self {
        Self::new(cfg.sniff_bytes)
    }

    pub fn sniff_bytes(&self) -> usize {
        self.sniff_bytes
    }

    /// Classify an in-memory head of a file.
    pub fn classify_bytes(&self, head: &[u8]) -> Classification {
        let head = &head[..head.len().min(self.sniff_bytes)];
        if head.is_empty() {
            return Classification::EMPTY;
        }
        if head.contains(&0) {
            return Classification::BINARY;
        }
        let control = head.iter().filter(|&&b| is_binary_control(b)).count();
        if control * 10 > head.len() * 3 {
            Classification::BINARY
        } else {
            Classification::TEXT
        }
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

impl ContentClassifier for HeuristicClassifier {
    fn classify(&self, path: &Path) -> Result<Classification, IngestError> {
        let file = File::open(path).map_err(|err| IngestError::io(path, &err))?;
        let mut head = Vec::with_capacity(self.sniff_bytes.min(64 * 1024));
        file.take(self.sniff_bytes as u64)
            .read_to_end(&mut head)
            .map_err(|err| IngestError::io(path, &err))?;
        Ok(self.classify_bytes(&head))
    }
}

fn is_binary_control(byte: u8) -> bool {
    match byte {
        b'\t' | b'\n' | b'\r' | 0x0c | 0x08 | 0x1b => false,
        0x00..=0x1f | 0x7f => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn classifies_text_and_binary() {
        let classifier = HeuristicClassifier::default();
        assert_eq!(
            classifier.classify_bytes(b"int main(void) {\n\treturn 0;\n}\n"),
            Classification::TEXT
        );
        assert_eq!(
            classifier.classify_bytes("na\u{ef}ve caf\u{e9}".as_bytes()),
            Classification::TEXT
        );
        assert_eq!(
            classifier.classify_bytes(b"\x7fELF\x02\x01\x01\x00"),
            Classification::BINARY
        );
        assert_eq!(
            classifier.classify_bytes(&[0x01, 0x02, 0x03, b'a']),
            Classification::BINARY
        );
        assert_eq!(classifier.classify_bytes(b""), Classification::EMPTY);
    }

    #[test]
    fn only_the_head_is_sniffed() {
        let classifier = HeuristicClassifier::new(4);
        assert_eq!(
            classifier.classify_bytes(b"text\0\0\0\0"),
            Classification::TEXT
        );
    }

    #[test]
    fn classifies_files_on_disk() {
        let mut text = NamedTempFile::new().unwrap();
        text.write_all(b"hello world\n").unwrap();
        let mut binary = NamedTempFile::new().unwrap();
        binary.write_all(&[0u8, 159, 146, 150]).unwrap();

        let classifier = HeuristicClassifier::default();
        assert!(classifier.classify(text.path()).unwrap().is_text);
        assert!(classifier.classify(binary.path()).unwrap().is_binary);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            HeuristicClassifier::default().classify(&missing),
            Err(IngestError::Io { .. })
        ));
    }

    #[test]
    fn regular_file_guard() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        assert!(is_regular_file(&file));
        assert!(!is_regular_file(dir.path()));
        assert!(!is_regular_file(&dir.path().join("nope")));

        #[cfg(unix)]
        {
            let link = dir.path().join("link.txt");
            std::os::unix::fs::symlink(&file, &link).unwrap();
            assert!(!is_regular_file(&link));
        }
    }
}
