// File: mtree-merkle/src/leaf.rs
use crate::{Config, DataBlock, Digest, MerkleError};

/// Leaf for a single block: its digest, or an owned copy of its bytes when
/// leaf hashing is disabled.
pub(crate) fn leaf_from_block<B: DataBlock + ?Sized>(block: &B, config: &Config) -> Result<Digest, MerkleError> {
    let bytes = block.serialize().map_err(MerkleError::Serialization)?;
    if config.disable_leaf_hashing {
        return Ok(bytes.into_owned());
    }
    Ok(config.hash.hash(&bytes)?)
}

pub(crate) fn leaves_sequential<B: DataBlock>(blocks: &[B], config: &Config) -> Result<Vec<Digest>, MerkleError> {
    blocks.iter().map(|b| leaf_from_block(b, config)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtree_hash::sha3_256;

    #[test]
    fn hashed_leaf_is_digest_of_bytes() {
        let cfg = Config::default();
        assert_eq!(leaf_from_block("abc", &cfg).unwrap(), sha3_256(b"abc").to_vec());
    }

    #[test]
    fn raw_leaf_is_a_copy() {
        let cfg = Config { disable_leaf_hashing: true, ..Config::default() };
        let mut source = b"payload".to_vec();
        let leaf = leaf_from_block(&source, &cfg).unwrap();
        source[0] = b'X';
        assert_eq!(leaf, b"payload".to_vec());
    }

    #[test]
    fn sequential_leaves_keep_order() {
        let cfg = Config::default();
        let leaves = leaves_sequential(&["x", "y", "z"], &cfg).unwrap();
        assert_eq!(leaves[1], sha3_256(b"y").to_vec());
        assert_eq!(leaves.len(), 3);
    }
}
