//! halofp canonical text layer.
//!
//! This crate turns raw text into the token stream that every fingerprint in
//! halofp is built from, and provides the sliding n-gram generator used both
//! over tokens and over n-grams.
//!
//! ## What we do
//!
//! - Lowercase the text (Unicode, locale independent)
//! - Split it into maximal runs of Unicode letters and digits
//! - Slide fixed-size windows over any sequence ([`ngrams`])
//!
//! ## What we don't do
//!
//! No Unicode normalization, no stemming, no stop words. Punctuation,
//! whitespace and underscores are separators and never part of a token.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no OS/locale dependence. Fingerprints produced by
//! different machines are only comparable because this layer is stable, so
//! any behavior change here invalidates every stored fingerprint.
//!
//! ```
//! use canonical::{ngrams, tokenize};
//!
//! let tokens = tokenize("some Text with   spAces! + _ -");
//! assert_eq!(tokens, vec!["some", "text", "with", "spaces"]);
//!
//! let pairs: Vec<_> = ngrams(&tokens, 2).collect();
//! assert_eq!(pairs.len(), 3);
//! assert_eq!(pairs[0], ["some", "text"]);
//! ```

mod ngram;
mod token;

pub use crate::ngram::ngrams;
pub use crate::token::{is_token_char, tokenize};
