// File: mtree-merkle/src/tree.rs
use std::panic::resume_unwind;
use std::thread;

use mtree_pool::WorkerPool;
use tracing::{debug, trace};

use crate::index::LeafIndex;
use crate::leaf::leaf_from_block;
use crate::parallel::{balance, Executor};
use crate::proof::{walk, Proof};
use crate::{verify, Config, DataBlock, Digest, MerkleError, Mode};

/// Deepest tree a `u32` path can describe.
pub const MAX_DEPTH: usize = 32;

/// Immutable Merkle tree over at least two data blocks.
#[derive(Debug)]
pub struct MerkleTree {
    config: Config,
    num_leaves: usize,
    depth: usize,
    leaves: Vec<Digest>,
    root: Digest,
    /// Per-leaf proofs; empty in [`Mode::TreeBuild`].
    proofs: Vec<Proof>,
    /// Balanced levels below the root, leaves first; empty in [`Mode::ProofGen`].
    levels: Vec<Vec<Digest>>,
    index: Option<LeafIndex>,
}

/// Smallest `d` with `2^d >= n`, for `n >= 2`.
#[inline]
pub(crate) fn depth_for(num_leaves: usize) -> usize {
    (usize::BITS - (num_leaves - 1).leading_zeros()) as usize
}

impl MerkleTree {
    pub fn new<B: DataBlock + Sync>(mut config: Config, blocks: &[B]) -> Result<Self, MerkleError> {
        let num_leaves = blocks.len();
        if num_leaves <= 1 {
            return Err(MerkleError::invalid("the number of data blocks must be greater than 1"));
        }
        let depth = depth_for(num_leaves);
        if depth > MAX_DEPTH {
            return Err(MerkleError::invalid(format!("tree depth {depth} exceeds {MAX_DEPTH} levels")));
        }

        let pool = if config.parallel {
            let pool = WorkerPool::new(config.workers)?;
            config.workers = pool.workers();
            Some(pool)
        } else {
            None
        };
        let exec = pool.as_ref().map_or(Executor::Sequential, Executor::Pool);
        debug!(num_leaves, depth, mode = %config.mode, parallel = config.parallel, workers = config.workers, "building merkle tree");

        let leaves = exec.leaves(blocks, &config)?;
        let mut tree = Self {
            config,
            num_leaves,
            depth,
            leaves,
            root: Digest::new(),
            proofs: Vec::new(),
            levels: Vec::new(),
            index: None,
        };
        match tree.config.mode {
            Mode::ProofGen => tree.stream_proofs(exec)?,
            Mode::TreeBuild => tree.build(exec)?,
            Mode::ProofGenAndTreeBuild => {
                tree.build(exec)?;
                tree.proofs_from_levels(exec);
            }
        }
        debug!(root_len = tree.root.len(), proofs = tree.proofs.len(), "merkle tree built");
        Ok(tree)
    }

    /// Retain every level while the leaf index is built alongside.
    fn build(&mut self, exec: Executor<'_>) -> Result<(), MerkleError> {
        let (index, built) = match exec {
            Executor::Pool(pool) => pool.join(
                || LeafIndex::build(&self.leaves),
                || build_levels(&self.leaves, self.depth, exec, &self.config),
            ),
            Executor::Sequential => thread::scope(|s| {
                let handle = s.spawn(|| LeafIndex::build(&self.leaves));
                let built = build_levels(&self.leaves, self.depth, exec, &self.config);
                (handle.join().unwrap_or_else(|panic| resume_unwind(panic)), built)
            }),
        };
        let (levels, root) = built?;
        self.levels = levels;
        self.root = root;
        self.index = Some(index);
        Ok(())
    }

    /// Derive every proof while holding a single level at a time.
    fn stream_proofs(&mut self, exec: Executor<'_>) -> Result<(), MerkleError> {
        let mut proofs = vec![Proof::with_depth(self.depth); self.num_leaves];
        let mut buf = self.leaves.clone();
        let mut spare = Vec::new();
        balance(&mut buf);
        exec.record(&mut proofs, &buf, 0);
        for step in 1..self.depth {
            exec.advance(&mut buf, &mut spare, &self.config)?;
            trace!(step, width = buf.len(), "streamed level");
            exec.record(&mut proofs, &buf, step);
        }
        self.root = self.config.concat().hash_pair(&*self.config.hash, &buf[0], &buf[1])?;
        self.proofs = proofs;
        Ok(())
    }

    fn proofs_from_levels(&mut self, exec: Executor<'_>) {
        let mut proofs = vec![Proof::with_depth(self.depth); self.num_leaves];
        for (step, level) in self.levels.iter().enumerate() {
            exec.record(&mut proofs, level, step);
        }
        self.proofs = proofs;
    }

    /// Proof for `block`, read from the retained levels.
    pub fn proof_for<B: DataBlock + ?Sized>(&self, block: &B) -> Result<Proof, MerkleError> {
        let index = match (&self.index, self.config.mode.retains_tree()) {
            (Some(index), true) => index,
            _ => return Err(MerkleError::ProofUnavailable),
        };
        let leaf = leaf_from_block(block, &self.config)?;
        let pos = index.get(&leaf).ok_or(MerkleError::BlockNotFound)?;
        Ok(walk(&self.levels, pos))
    }

    /// Verify `block` against this tree's root and configuration.
    pub fn verify<B: DataBlock + ?Sized>(&self, block: &B, proof: &Proof) -> Result<bool, MerkleError> {
        verify(Some(block), Some(proof), &self.root, &self.config)
    }

    pub fn root(&self) -> &[u8] { &self.root }
    pub fn leaves(&self) -> &[Digest] { &self.leaves }
    pub fn proofs(&self) -> &[Proof] { &self.proofs }
    pub fn levels(&self) -> &[Vec<Digest>] { &self.levels }
    pub fn depth(&self) -> usize { self.depth }
    pub fn num_leaves(&self) -> usize { self.num_leaves }
    pub fn config(&self) -> &Config { &self.config }
    pub fn mode(&self) -> Mode { self.config.mode }
}

/// Levels `0..depth` (each balanced) and the root hashed from the last one.
fn build_levels(
    leaves: &[Digest],
    depth: usize,
    exec: Executor<'_>,
    config: &Config,
) -> Result<(Vec<Vec<Digest>>, Digest), MerkleError> {
    let mut levels = Vec::with_capacity(depth);
    let mut base = leaves.to_vec();
    balance(&mut base);
    levels.push(base);
    for i in 0..depth - 1 {
        let next = exec.next_level(&levels[i], config)?;
        trace!(level = i + 1, width = next.len(), "built level");
        levels.push(next);
    }
    let top = &levels[depth - 1];
    let root = config.concat().hash_pair(&*config.hash, &top[0], &top[1])?;
    Ok((levels, root))
}
