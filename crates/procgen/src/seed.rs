//! Seed chains: reproducible hex strings derived from text keys.
//!
//! **Determinism:** the hash is 64-bit FNV-1a over the key's UTF-8 bytes, so a key maps to
//! the same seed on every platform and toolchain. `std::hash::DefaultHasher` makes no such
//! promise and must not be used here.

use std::fmt;

use crate::error::{GenerationError, Result};

/// Number of hex characters in a seed.
pub const SEED_LEN: usize = 64;

/// Number of probabilities extracted from one seed.
pub const PROBABILITY_SLOTS: usize = 8;

const CHUNK_LEN: usize = SEED_LEN / PROBABILITY_SLOTS;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a64(parts: &[&[u8]]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for part in parts {
        for &b in *part {
            hash ^= b as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// A 64-character lowercase hex string. Both an identity and an entropy source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    /// Accept an externally supplied seed. It must be exactly [`SEED_LEN`] hex characters.
    pub fn parse(hex: &str) -> Result<Self> {
        if hex.len() != SEED_LEN {
            return Err(GenerationError::InvalidSeedLength {
                expected: SEED_LEN,
                actual: hex.len(),
            });
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GenerationError::InvalidHex(hex.to_string()));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last `n` characters (the whole seed if `n >= SEED_LEN`).
    pub fn tail(&self, n: usize) -> &str {
        &self.0[SEED_LEN.saturating_sub(n)..]
    }

    /// Derive the next seed in the chain by re-hashing this one.
    pub fn rehash(&self) -> Seed {
        derive_seed(&self.0)
    }

    /// Eight probabilities in [0, 1], one per 8-character chunk.
    pub fn probabilities(&self) -> [f32; PROBABILITY_SLOTS] {
        chunk_probabilities(self.0.as_bytes())
    }

    /// Collapse the seed into a `u64` for seeding `rand` generators.
    pub fn rng_seed(&self) -> u64 {
        fnv1a64(&[self.0.as_bytes()])
    }

    /// Collapse the seed into an `i32` for seeding a [`crate::NoiseField`].
    pub fn noise_seed(&self) -> i32 {
        let wide = self.rng_seed();
        (wide ^ (wide >> 32)) as u32 as i32
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Seed {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive a seed from `key`. Identical keys always give identical seeds; the empty key is allowed.
///
/// The key hash is rendered as hex; while shorter than [`SEED_LEN`] the string grows by
/// appending the hash of `current + key`, and the last [`SEED_LEN`] characters are kept.
pub fn derive_seed(key: &str) -> Seed {
    let mut hex = format!("{:x}", fnv1a64(&[key.as_bytes()]));
    while hex.len() < SEED_LEN {
        let next = fnv1a64(&[hex.as_bytes(), key.as_bytes()]);
        hex.push_str(&format!("{:x}", next));
    }
    if hex.len() > SEED_LEN {
        hex.drain(..hex.len() - SEED_LEN);
    }
    Seed(hex)
}

/// Extract probabilities from a raw hex string. Only the first [`SEED_LEN`] characters are read.
pub fn probabilities_from_hex(hex: &str) -> Result<[f32; PROBABILITY_SLOTS]> {
    if hex.len() < SEED_LEN {
        return Err(GenerationError::InvalidSeedLength {
            expected: SEED_LEN,
            actual: hex.len(),
        });
    }
    let head = &hex.as_bytes()[..SEED_LEN];
    if !head.iter().all(|b| b.is_ascii_hexdigit()) {
        return Err(GenerationError::InvalidHex(hex.to_string()));
    }
    Ok(chunk_probabilities(head))
}

/// Expects at least `SEED_LEN` ASCII hex digits.
fn chunk_probabilities(hex: &[u8]) -> [f32; PROBABILITY_SLOTS] {
    let mut out = [0.0; PROBABILITY_SLOTS];
    for (slot, chunk) in out.iter_mut().zip(hex.chunks_exact(CHUNK_LEN)) {
        let value = chunk
            .iter()
            .fold(0u32, |acc, &b| (acc << 4) | hex_digit(b));
        *slot = (value as f64 / u32::MAX as f64) as f32;
    }
    out
}

fn hex_digit(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => (b - b'0') as u32,
        b'a'..=b'f' => (b - b'a' + 10) as u32,
        b'A'..=b'F' => (b - b'A' + 10) as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a64_matches_reference_vectors() {
        assert_eq!(fnv1a64(&[b""]), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(&[b"a"]), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a64(&[b"foo"]), 0xdcb27518fed9d577);
        assert_eq!(fnv1a64(&[b"fo", b"o"]), fnv1a64(&[b"foo"]));
    }

    #[test]
    fn derive_seed_is_deterministic() {
        for key in ["", "SUN", "alpha-P-3", "żółw"] {
            assert_eq!(derive_seed(key), derive_seed(key));
        }
    }

    #[test]
    fn derive_seed_shape() {
        for key in ["", "a", "SUN", "a much longer key with spaces and digits 0123456789"] {
            let seed = derive_seed(key);
            assert_eq!(seed.as_str().len(), SEED_LEN, "key {:?}", key);
            assert!(seed.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn different_keys_give_different_seeds() {
        assert_ne!(derive_seed("SUN"), derive_seed("MOON"));
        assert_ne!(derive_seed("P-1"), derive_seed("P-2"));
    }

    #[test]
    fn probabilities_in_unit_interval() {
        for key in ["", "SUN", "x", "root-A-17"] {
            for p in derive_seed(key).probabilities() {
                assert!((0.0..=1.0).contains(&p), "{} out of range for {:?}", p, key);
            }
        }
    }

    #[test]
    fn sun_first_chunk_matches_first_probability() {
        let s = derive_seed("SUN");
        let first = u32::from_str_radix(&s.as_str()[..8], 16).unwrap();
        let expected = (first as f64 / 0xFFFF_FFFFu32 as f64) as f32;
        assert_eq!(probabilities_from_hex(s.as_str()).unwrap()[0], expected);
        assert_eq!(s.probabilities()[0], expected);
    }

    #[test]
    fn probability_extremes() {
        let zeros = "0".repeat(SEED_LEN);
        let ones = "f".repeat(SEED_LEN);
        assert_eq!(probabilities_from_hex(&zeros).unwrap(), [0.0; 8]);
        assert_eq!(probabilities_from_hex(&ones).unwrap(), [1.0; 8]);
    }

    #[test]
    fn short_or_bad_seed_is_rejected() {
        assert_eq!(
            probabilities_from_hex("abc"),
            Err(GenerationError::InvalidSeedLength { expected: 64, actual: 3 })
        );
        let bad = format!("{}zz", "0".repeat(62));
        assert!(matches!(probabilities_from_hex(&bad), Err(GenerationError::InvalidHex(_))));
        assert!(Seed::parse(&"a".repeat(63)).is_err());
        assert!(Seed::parse(&"A".repeat(64)).is_ok());
    }

    #[test]
    fn overlong_seed_reports_its_length() {
        assert_eq!(
            Seed::parse(&"a".repeat(65)),
            Err(GenerationError::InvalidSeedLength { expected: 64, actual: 65 })
        );
        let bad = format!("{}g", "0".repeat(63));
        assert!(matches!(Seed::parse(&bad), Err(GenerationError::InvalidHex(_))));
    }

    #[test]
    fn tail_and_rehash() {
        let seed = derive_seed("SUN");
        assert_eq!(seed.tail(8), &seed.as_str()[56..]);
        assert_eq!(seed.rehash(), derive_seed(seed.as_str()));
        assert_ne!(seed.rehash(), seed);
    }
}
