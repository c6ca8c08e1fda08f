// File: mtree-merkle/src/error.rs
use mtree_hash::HashError;
use mtree_pool::PoolError;
use thiserror::Error;

use crate::block::BlockError;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("data block serialization failed: {0}")]
    Serialization(#[source] BlockError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("{0} is nil")]
    NilInput(&'static str),
    #[error("merkle tree is not built, could not generate proof by this method")]
    ProofUnavailable,
    #[error("data block is not a member of the merkle tree")]
    BlockNotFound,
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl MerkleError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self { MerkleError::InvalidInput(msg.into()) }
}
