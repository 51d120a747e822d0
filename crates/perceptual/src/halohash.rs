//! Bit-average halo hash.
//!
//! A locality-sensitive digest over a bag of byte strings. Every element is
//! hashed with a cryptographic hash whose output is exactly `bits` wide
//! (MD5 for 128, SHA-1 for 160, SHA-256 for 256). The hash bits are summed
//! column by column, and output bit `i` is set when column `i` is strictly
//! above the mean of all columns. Adding, removing or altering a few elements
//! moves only a few columns across the mean, so similar bags end up a small
//! Hamming distance apart.
//!
//! Bits are read and written most significant first within each byte.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::PerceptualError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementHasher {
    Md5,
    Sha1,
    Sha256,
}

impl ElementHasher {
    fn for_bits(bits: usize) -> Result<Self, PerceptualError> {
        match bits {
            128 => Ok(Self::Md5),
            160 => Ok(Self::Sha1),
            256 => Ok(Self::Sha256),
            bits => Err(PerceptualError::UnsupportedDigestBits { bits }),
        }
    }

    fn hash(self, element: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(element).to_vec(),
            Self::Sha1 => Sha1::digest(element).to_vec(),
            Self::Sha256 => Sha256::digest(element).to_vec(),
        }
    }
}

/// Accumulating bit-average halo hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitAverageHaloHash {
    hasher: ElementHasher,
    columns: Vec<u64>,
    elements: usize,
}

impl BitAverageHaloHash {
    /// Create an empty hash of `bits` width.
    pub fn new(bits: usize) -> Result<Self, PerceptualError> {
        let hasher = ElementHasher::for_bits(bits)?;
        Ok(Self {
            hasher,
            columns: vec![0; bits],
            elements: 0,
        })
    }

    /// Create a hash of `bits` width over every element of `elements`.
    pub fn from_elements<I, B>(elements: I, bits: usize) -> Result<Self, PerceptualError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut halo = Self::new(bits)?;
        halo.extend(elements);
        Ok(halo)
    }

    /// Add one element.
    pub fn update(&mut self, element: &[u8]) {
        let digest = self.hasher.hash(element);
        for (i, column) in self.columns.iter_mut().enumerate() {
            let byte = digest[i / 8];
            *column += u64::from((byte >> (7 - i % 8)) & 1);
        }
        self.elements += 1;
    }

    /// Add every element of `elements`.
    pub fn extend<I, B>(&mut self, elements: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for element in elements {
            self.update(element.as_ref());
        }
    }

    /// Digest width in bits.
    pub fn bits(&self) -> usize {
        self.columns.len()
    }

    /// Number of elements hashed so far.
    pub fn elements_count(&self) -> usize {
        self.elements
    }

    /// Raw digest, `bits / 8` bytes.
    pub fn digest(&self) -> Vec<u8> {
        let bits = self.columns.len() as u64;
        let total: u64 = self.columns.iter().sum();
        let mut out = vec![0u8; self.columns.len() / 8];
        for (i, &column) in self.columns.iter().enumerate() {
            // column > total / bits, kept in integers
            if column * bits > total {
                out[i / 8] |= 1 << (7 - i % 8);
            }
        }
        out
    }

    /// Lowercase hex digest, `bits / 4` characters.
    pub fn hexdigest(&self) -> String {
        hex::encode(self.digest())
    }

    /// Hamming distance between two digests of the same width.
    pub fn distance(&self, other: &Self) -> Result<u32, PerceptualError> {
        if self.bits() != other.bits() {
            return Err(PerceptualError::DigestWidthMismatch {
                left: self.bits(),
                right: other.bits(),
            });
        }
        Ok(hamming_distance(&self.digest(), &other.digest()))
    }
}

/// Number of differing bits between two equally sized byte strings.
///
/// Extra trailing bytes of the longer input are ignored.
pub fn hamming_distance(left: &[u8], right: &[u8]) -> u32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a ^ b).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(prefix: &str, count: usize) -> Vec<Vec<u8>> {
        (0..count)
            .map(|i| format!("{prefix} {i}").into_bytes())
            .collect()
    }

    #[test]
    fn empty_hash_is_all_zero() {
        let halo = BitAverageHaloHash::new(128).unwrap();
        assert_eq!(halo.hexdigest(), "0".repeat(32));
        assert_eq!(halo.elements_count(), 0);
    }

    #[test]
    fn hex_length_follows_bits() {
        for bits in [128, 160, 256] {
            let halo = BitAverageHaloHash::from_elements(words("w", 10), bits).unwrap();
            assert_eq!(halo.hexdigest().len(), bits / 4);
            assert_eq!(halo.digest().len(), bits / 8);
        }
    }

    #[test]
    fn unsupported_width_is_rejected() {
        assert_eq!(
            BitAverageHaloHash::new(64),
            Err(PerceptualError::UnsupportedDigestBits { bits: 64 })
        );
    }

    #[test]
    fn single_element_reproduces_its_hash_bits() {
        // With one element every column is 0 or 1 and the mean sits in
        // between, so the digest is the element hash itself.
        let halo = BitAverageHaloHash::from_elements([b"hello".as_slice()], 128).unwrap();
        assert_eq!(halo.hexdigest(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn deterministic() {
        let a = BitAverageHaloHash::from_elements(words("line", 50), 128).unwrap();
        let b = BitAverageHaloHash::from_elements(words("line", 50), 128).unwrap();
        assert_eq!(a.hexdigest(), b.hexdigest());
    }

    #[test]
    fn incremental_update_matches_batch() {
        let elements = words("x", 20);
        let batch = BitAverageHaloHash::from_elements(&elements, 128).unwrap();
        let mut incremental = BitAverageHaloHash::new(128).unwrap();
        for element in &elements {
            incremental.update(element);
        }
        assert_eq!(batch, incremental);
        assert_eq!(incremental.elements_count(), 20);
    }

    #[test]
    fn small_edit_has_small_distance() {
        let base = words("token", 200);
        let mut edited = base.clone();
        edited[17] = b"something else".to_vec();

        let a = BitAverageHaloHash::from_elements(&base, 128).unwrap();
        let b = BitAverageHaloHash::from_elements(&edited, 128).unwrap();
        let unrelated = BitAverageHaloHash::from_elements(words("other", 200), 128).unwrap();

        let near = a.distance(&b).unwrap();
        let far = a.distance(&unrelated).unwrap();
        assert!(near < far, "near={near} far={far}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = BitAverageHaloHash::from_elements(words("w", 30), 160).unwrap();
        assert_eq!(a.distance(&a), Ok(0));
    }

    #[test]
    fn distance_requires_same_width() {
        let a = BitAverageHaloHash::new(128).unwrap();
        let b = BitAverageHaloHash::new(256).unwrap();
        assert_eq!(
            a.distance(&b),
            Err(PerceptualError::DigestWidthMismatch {
                left: 128,
                right: 256
            })
        );
    }

    #[test]
    fn hamming_distance_counts_bits() {
        assert_eq!(hamming_distance(&[0b1010_0000], &[0b0110_0001]), 3);
        assert_eq!(hamming_distance(&[0xff, 0x00], &[0x00, 0xff]), 16);
    }
}
