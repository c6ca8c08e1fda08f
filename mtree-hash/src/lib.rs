// File: mtree-hash/src/lib.rs
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use sha3::{digest::{ExtendableOutput, Update, XofReader}, Digest, Keccak256, Sha3_256, Shake256};
use thiserror::Error;

pub const SHA3_256_LEN: usize = 32;
pub const SHAKE256_384_LEN: usize = 48; // 384-bit output

/// Failure raised by a digest function.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("hash function failed: {0}")]
pub struct HashError(pub String);

impl HashError {
    pub fn new(msg: impl Into<String>) -> Self { Self(msg.into()) }
}

/// Pluggable digest used for leaves and interior nodes.
///
/// Implementations are called concurrently from pool workers when parallel
/// construction is enabled, hence the `Send + Sync` bound.
pub trait HashFunction: Send + Sync {
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>, HashError>;
}

impl<F> HashFunction for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, HashError> + Send + Sync,
{
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>, HashError> { self(data) }
}

#[inline]
pub fn sha3_256(data: &[u8]) -> [u8; SHA3_256_LEN] {
    let mut out = [0u8; SHA3_256_LEN];
    out.copy_from_slice(&Sha3_256::digest(data));
    out
}

#[inline]
pub fn keccak256(data: &[u8]) -> [u8; SHA3_256_LEN] {
    let mut out = [0u8; SHA3_256_LEN];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

#[inline]
pub fn shake256_384(data: &[u8]) -> [u8; SHAKE256_384_LEN] {
    let mut hasher = Shake256::default();
    hasher.update(data);
    let mut xof = hasher.finalize_xof();
    let mut out = [0u8; SHAKE256_384_LEN];
    xof.read(&mut out);
    out
}

/// Built-in digests. All of them are stateless per call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "keccak256")]
    Keccak256,
    #[serde(rename = "shake256-384")]
    Shake256_384,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Keccak256 => "keccak256",
            HashAlgorithm::Shake256_384 => "shake256-384",
        }
    }

    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha3_256 | HashAlgorithm::Keccak256 => SHA3_256_LEN,
            HashAlgorithm::Shake256_384 => SHAKE256_384_LEN,
        }
    }
}

impl HashFunction for HashAlgorithm {
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>, HashError> {
        Ok(match self {
            HashAlgorithm::Sha3_256 => sha3_256(data).to_vec(),
            HashAlgorithm::Keccak256 => keccak256(data).to_vec(),
            HashAlgorithm::Shake256_384 => shake256_384(data).to_vec(),
        })
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            "keccak256" | "keccak-256" => Ok(HashAlgorithm::Keccak256),
            "shake256-384" | "shake256_384" => Ok(HashAlgorithm::Shake256_384),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// How two sibling digests are joined before hashing their parent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Concat {
    /// `left || right`
    #[default]
    Ordered,
    /// Smaller operand first, so the parent does not depend on child order.
    Sorted,
}

impl Concat {
    pub fn from_sort_flag(sort_sibling_pairs: bool) -> Self {
        if sort_sibling_pairs { Concat::Sorted } else { Concat::Ordered }
    }

    #[inline]
    pub fn join(&self, a: &[u8], b: &[u8]) -> Vec<u8> {
        match self {
            Concat::Ordered => concat(a, b),
            Concat::Sorted => match a.cmp(b) {
                Ordering::Less => concat(a, b),
                _ => concat(b, a),
            },
        }
    }

    /// Hash of the joined pair, i.e. one parent node.
    #[inline]
    pub fn hash_pair<H: HashFunction + ?Sized>(&self, hash: &H, a: &[u8], b: &[u8]) -> Result<Vec<u8>, HashError> {
        hash.hash(&self.join(a, b))
    }
}

#[inline]
fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lengths_and_differ() {
        for alg in [HashAlgorithm::Sha3_256, HashAlgorithm::Keccak256, HashAlgorithm::Shake256_384] {
            let a = alg.hash(b"hello").unwrap();
            let b = alg.hash(b"world").unwrap();
            assert_eq!(a.len(), alg.output_len());
            assert_ne!(a, b);
        }
        assert_ne!(sha3_256(b"x"), keccak256(b"x"));
    }

    #[test]
    fn sha3_256_known_vector() {
        // SHA3-256("abc")
        let expected = [
            0x3a, 0x98, 0x5d, 0xa7, 0x4f, 0xe2, 0x25, 0xb2, 0x04, 0x5c, 0x17, 0x2d, 0x6b, 0xd3, 0x90, 0xbd,
            0x85, 0x5f, 0x08, 0x6e, 0x3e, 0x9d, 0x52, 0x5b, 0x46, 0xbf, 0xe2, 0x45, 0x11, 0x43, 0x15, 0x32,
        ];
        assert_eq!(sha3_256(b"abc"), expected);
    }

    #[test]
    fn algorithm_names_parse_back() {
        for alg in [HashAlgorithm::Sha3_256, HashAlgorithm::Keccak256, HashAlgorithm::Shake256_384] {
            assert_eq!(alg.name().parse::<HashAlgorithm>().unwrap(), alg);
        }
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn ordered_concat_keeps_operand_order() {
        assert_eq!(Concat::Ordered.join(b"ab", b"cd"), b"abcd".to_vec());
        assert_eq!(Concat::Ordered.join(b"cd", b"ab"), b"cdab".to_vec());
    }

    #[test]
    fn sorted_concat_is_order_independent() {
        assert_eq!(Concat::Sorted.join(b"ab", b"cd"), b"abcd".to_vec());
        assert_eq!(Concat::Sorted.join(b"cd", b"ab"), b"abcd".to_vec());
        assert_eq!(Concat::Sorted.join(b"zz", b"zz"), b"zzzz".to_vec());
        let h = HashAlgorithm::default();
        assert_eq!(
            Concat::Sorted.hash_pair(&h, b"x", b"y").unwrap(),
            Concat::Sorted.hash_pair(&h, b"y", b"x").unwrap()
        );
    }

    #[test]
    fn closures_are_hash_functions() {
        let f = |d: &[u8]| -> Result<Vec<u8>, HashError> { Ok(d.iter().rev().copied().collect()) };
        assert_eq!(f.hash(b"abc").unwrap(), b"cba".to_vec());
        let failing = |_: &[u8]| -> Result<Vec<u8>, HashError> { Err(HashError::new("boom")) };
        assert_eq!(failing.hash(b"abc").unwrap_err(), HashError::new("boom"));
    }
}
