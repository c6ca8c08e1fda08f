// File: mtree-merkle/src/lib.rs
//! Binary Merkle tree with per-leaf inclusion proofs.
//!
//! Odd levels are balanced by duplicating their last node. A tree is built in
//! one of three [`Mode`]s: streaming (root and every proof, one level in
//! memory at a time), retained (every level plus a leaf index for
//! [`MerkleTree::proof_for`]), or both. All modes, sequential or parallel,
//! produce the same root and the same proofs.

mod block;
mod config;
mod error;
mod index;
mod leaf;
mod parallel;
mod proof;
mod tree;
mod verify;

pub use block::{BlockError, DataBlock};
pub use config::{Config, Mode};
pub use error::MerkleError;
pub use index::LeafIndex;
pub use mtree_hash::{Concat, HashAlgorithm, HashError, HashFunction};
pub use proof::Proof;
pub use tree::{MerkleTree, MAX_DEPTH};
pub use verify::verify;

/// A leaf or interior node.
pub type Digest = Vec<u8>;
