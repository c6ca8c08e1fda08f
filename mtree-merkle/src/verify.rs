// File: mtree-merkle/src/verify.rs
use crate::leaf::leaf_from_block;
use crate::{Config, DataBlock, MerkleError, Proof};

/// Replay `proof` for `block` and compare against `root`.
///
/// Needs no tree, only the configuration the tree was built with. A
/// mismatch is `Ok(false)`; errors are reserved for missing input and for
/// serialization or hash failures.
pub fn verify<B: DataBlock + ?Sized>(
    block: Option<&B>,
    proof: Option<&Proof>,
    root: &[u8],
    config: &Config,
) -> Result<bool, MerkleError> {
    let block = block.ok_or(MerkleError::NilInput("data block"))?;
    let proof = proof.ok_or(MerkleError::NilInput("proof"))?;
    let concat = config.concat();
    let mut acc = leaf_from_block(block, config)?;
    let mut path = proof.path;
    for sib in &proof.siblings {
        acc = if path & 1 == 1 {
            concat.hash_pair(&*config.hash, &acc, sib)?
        } else {
            concat.hash_pair(&*config.hash, sib, &acc)?
        };
        path >>= 1;
    }
    Ok(acc == root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtree_hash::{sha3_256, HashError};

    fn two_leaf_root(a: &[u8], b: &[u8]) -> Vec<u8> {
        let mut buf = sha3_256(a).to_vec();
        buf.extend_from_slice(&sha3_256(b));
        sha3_256(&buf).to_vec()
    }

    #[test]
    fn handmade_proof_verifies() {
        let root = two_leaf_root(b"left", b"right");
        let cfg = Config::default();
        let left = Proof { siblings: vec![sha3_256(b"right").to_vec()], path: 1 };
        let right = Proof { siblings: vec![sha3_256(b"left").to_vec()], path: 0 };
        assert!(verify(Some("left"), Some(&left), &root, &cfg).unwrap());
        assert!(verify(Some("right"), Some(&right), &root, &cfg).unwrap());
        assert!(!verify(Some("right"), Some(&left), &root, &cfg).unwrap());
    }

    #[test]
    fn missing_inputs_are_nil() {
        let cfg = Config::default();
        let proof = Proof::default();
        assert!(matches!(verify(None::<&str>, Some(&proof), b"r", &cfg), Err(MerkleError::NilInput("data block"))));
        assert!(matches!(verify(Some("x"), None, b"r", &cfg), Err(MerkleError::NilInput("proof"))));
    }

    #[test]
    fn hash_failures_propagate() {
        let cfg = Config::default().with_hash(|_: &[u8]| -> Result<Vec<u8>, HashError> { Err(HashError::new("down")) });
        let proof = Proof::default();
        assert!(matches!(verify(Some("x"), Some(&proof), b"r", &cfg), Err(MerkleError::Hash(_))));
    }

    #[test]
    fn wrong_root_length_is_false() {
        let cfg = Config::default();
        let proof = Proof { siblings: vec![sha3_256(b"b").to_vec()], path: 1 };
        let mut root = two_leaf_root(b"a", b"b");
        root.push(0);
        assert!(!verify(Some("a"), Some(&proof), &root, &cfg).unwrap());
    }
}
