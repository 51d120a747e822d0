//! # halofp perceptual fingerprinting
//!
//! This crate turns a token stream into locality-sensitive fingerprints and
//! defines the string format directory fingerprints are exchanged in.
//!
//! ## Contract
//!
//! - The API is a pure function of `(tokens, config)` with no I/O and no
//!   reliance on clocks or global process state.
//! - For the same tokens and the same [`PerceptualConfig`] the output is bit
//!   identical, on any machine and whether or not `use_parallel` is set.
//!
//! ## Core Pipeline
//!
//! 1.  **N-grams**: overlapping runs of `ngram_length` tokens, each joined
//!     with a single space and taken as UTF-8 bytes.
//!
//! 2.  **Windows**: overlapping runs of `window_length` n-grams.
//!
//! 3.  **Hailstorm**: a content-anchored subset of the windows is kept (see
//!     [`select_windows`]). The first and last windows are always kept.
//!
//! 4.  **Halo hashing**: one [`BitAverageHaloHash`] over all n-grams of the
//!     file (`halo1`) and one per kept window (`chunks_halo1`).
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{fingerprint_text, PerceptualConfig};
//!
//! let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
//! let fingerprint = fingerprint_text(&text, &PerceptualConfig::default()).unwrap();
//!
//! assert_eq!(fingerprint.halo1.len(), 32);
//! assert!(!fingerprint.chunks_halo1.is_empty());
//! ```
//!
pub mod codec;
pub mod config;
pub mod fingerprint;
mod hailstorm;
mod halohash;

use rayon::prelude::*;

use canonical::{ngrams, tokenize};

pub use crate::codec::{
    decode_fingerprint, encode_fingerprint, is_ignored_fingerprint, to_binary_chunks, CodecError,
    DirectoryFingerprint, IGNORED_DIRECTORY_FINGERPRINTS,
};
pub use crate::config::{
    PerceptualConfig, PerceptualError, DEFAULT_DIGEST_BITS, DEFAULT_NGRAM_LENGTH,
    DEFAULT_WINDOW_LENGTH,
};
pub use crate::fingerprint::FileFingerprint;
pub use crate::hailstorm::{is_anchored, select_windows, window_hashes, Hailstorm};
pub use crate::halohash::{hamming_distance, BitAverageHaloHash};

/// Current fingerprint algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "hailstorm+bah_v1";

/// Join each n-gram of `tokens` with a single space, as UTF-8 bytes.
pub fn ngram_bytes<S: AsRef<str>>(tokens: &[S], ngram_length: usize) -> Vec<Vec<u8>> {
    ngrams(tokens, ngram_length)
        .map(|gram| {
            let mut joined = Vec::new();
            for (i, token) in gram.iter().enumerate() {
                if i > 0 {
                    joined.push(b' ');
                }
                joined.extend_from_slice(token.as_ref().as_bytes());
            }
            joined
        })
        .collect()
}

/// Compute the file fingerprint of an already tokenized text.
pub fn fingerprint_tokens<S>(
    tokens: &[S],
    cfg: &PerceptualConfig,
) -> Result<FileFingerprint, PerceptualError>
where
    S: AsRef<str>,
{
    cfg.validate()?;

    let grams = ngram_bytes(tokens, cfg.ngram_length);
    if grams.is_empty() {
        return Ok(FileFingerprint::default());
    }

    let halo1 = BitAverageHaloHash::from_elements(&grams, cfg.digest_bits)?.hexdigest();

    let selected = select_windows(ngrams(&grams, cfg.window_length));
    let chunks_halo1 = if cfg.use_parallel {
        let windows: Vec<&[Vec<u8>]> = selected.collect();
        windows
            .par_iter()
            .map(|window| hash_window(window, cfg.digest_bits))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        selected
            .map(|window| hash_window(window, cfg.digest_bits))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(FileFingerprint {
        halo1,
        chunks_halo1,
    })
}

/// Tokenize `text` and compute its file fingerprint.
pub fn fingerprint_text(
    text: &str,
    cfg: &PerceptualConfig,
) -> Result<FileFingerprint, PerceptualError> {
    fingerprint_tokens(&tokenize(text), cfg)
}

fn hash_window(window: &[Vec<u8>], bits: usize) -> Result<String, PerceptualError> {
    Ok(BitAverageHaloHash::from_elements(window, bits)?.hexdigest())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn ngram_bytes_join_with_single_space() {
        let tokens = ["a", "b", "c"];
        assert_eq!(
            ngram_bytes(&tokens, 2),
            vec![b"a b".to_vec(), b"b c".to_vec()]
        );
    }

    #[test]
    fn fewer_tokens_than_ngram_length_is_empty() {
        let fp = fingerprint_text("only seven tokens in this small text", &PerceptualConfig::default())
            .unwrap();
        assert_eq!(fp, FileFingerprint::default());
    }

    #[test]
    fn empty_text_is_empty() {
        let fp = fingerprint_text("", &PerceptualConfig::default()).unwrap();
        assert!(fp.is_empty());
    }

    #[test]
    fn fewer_ngrams_than_window_length_has_whole_file_hash_only() {
        // 20 tokens -> 13 n-grams, not enough for one 64 n-gram window.
        let fp = fingerprint_text(&numbered_words(20), &PerceptualConfig::default()).unwrap();
        assert_eq!(fp.halo1.len(), 32);
        assert!(fp.chunks_halo1.is_empty());
    }

    #[test]
    fn halo1_covers_all_ngrams() {
        let text = numbered_words(100);
        let tokens = tokenize(&text);
        let grams = ngram_bytes(&tokens, 8);
        let expected = BitAverageHaloHash::from_elements(&grams, 128)
            .unwrap()
            .hexdigest();

        let fp = fingerprint_text(&text, &PerceptualConfig::default()).unwrap();
        assert_eq!(fp.halo1, expected);
    }

    #[test]
    fn exactly_one_window_gives_one_chunk() {
        // 71 tokens -> 64 n-grams -> one window
        let text = numbered_words(71);
        let fp = fingerprint_text(&text, &PerceptualConfig::default()).unwrap();
        assert_eq!(fp.chunks_halo1.len(), 1);

        let tokens = tokenize(&text);
        let grams = ngram_bytes(&tokens, 8);
        let expected = BitAverageHaloHash::from_elements(&grams, 128)
            .unwrap()
            .hexdigest();
        assert_eq!(fp.chunks_halo1[0], expected);
    }

    #[test]
    fn chunks_match_selected_windows() {
        let text = numbered_words(400);
        let cfg = PerceptualConfig::default();
        let fp = fingerprint_text(&text, &cfg).unwrap();

        let tokens = tokenize(&text);
        let grams = ngram_bytes(&tokens, cfg.ngram_length);
        let expected: Vec<String> = select_windows(ngrams(&grams, cfg.window_length))
            .map(|w| BitAverageHaloHash::from_elements(w, 128).unwrap().hexdigest())
            .collect();

        assert_eq!(fp.chunks_halo1, expected);
        assert!(fp.chunks_halo1.len() >= 2);
        assert!(fp.chunks_halo1.len() <= grams.len() - cfg.window_length + 1);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let text = numbered_words(1000);
        let sequential = fingerprint_text(&text, &PerceptualConfig::default()).unwrap();
        let parallel =
            fingerprint_text(&text, &PerceptualConfig::default().with_parallel(true)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn deterministic_across_runs() {
        let text = numbered_words(300);
        let cfg = PerceptualConfig::default();
        assert_eq!(
            fingerprint_text(&text, &cfg).unwrap(),
            fingerprint_text(&text, &cfg).unwrap()
        );
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let cfg = PerceptualConfig::new().with_ngram_length(2).with_window_length(2);
        let a = fingerprint_text("Hello, World! fn main() {}", &cfg).unwrap();
        let b = fingerprint_text("hello world fn MAIN", &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wider_digests() {
        let cfg = PerceptualConfig::new().with_digest_bits(256);
        let fp = fingerprint_text(&numbered_words(100), &cfg).unwrap();
        assert_eq!(fp.halo1.len(), 64);
        assert!(fp.chunks_halo1.iter().all(|c| c.len() == 64));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = PerceptualConfig::new().with_digest_bits(100);
        assert_eq!(
            fingerprint_text("a b c d e f g h i j", &cfg),
            Err(PerceptualError::UnsupportedDigestBits { bits: 100 })
        );
    }
}
