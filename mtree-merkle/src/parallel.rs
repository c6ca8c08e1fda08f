// File: mtree-merkle/src/parallel.rs
//! Dispatch of per-leaf and per-level work, either inline or across a
//! [`WorkerPool`]. Every pooled task gets a residue class of slot indices
//! (see [`mtree_pool::partition`]) and owns `&mut` access to exactly those
//! slots, so workers never write the same slot and no locking is needed.
use mtree_hash::{Concat, HashFunction};
use mtree_pool::{partition, WorkerPool};

use crate::leaf::{leaf_from_block, leaves_sequential};
use crate::proof::{record_pair, Proof};
use crate::{Config, DataBlock, Digest, MerkleError};

/// Duplicate the last node of an odd-length level.
pub(crate) fn balance(level: &mut Vec<Digest>) {
    if level.len() & 1 == 1 {
        if let Some(last) = level.last().cloned() {
            level.push(last);
        }
    }
}

/// Some worker's error if any worker failed. Which one is unspecified.
fn first_error(results: Vec<Result<(), MerkleError>>) -> Result<(), MerkleError> {
    results.into_iter().collect()
}

struct LeafTask<'a, B> {
    blocks: &'a [B],
    slots: Vec<(usize, &'a mut Digest)>,
    config: &'a Config,
}

impl<B: DataBlock> LeafTask<'_, B> {
    fn run(self) -> Result<(), MerkleError> {
        for (i, slot) in self.slots {
            *slot = leaf_from_block(&self.blocks[i], self.config)?;
        }
        Ok(())
    }
}

struct HashTask<'a> {
    level: &'a [Digest],
    parents: Vec<(usize, &'a mut Digest)>,
    concat: Concat,
    hash: &'a dyn HashFunction,
}

impl HashTask<'_> {
    fn run(self) -> Result<(), MerkleError> {
        for (j, slot) in self.parents {
            *slot = self.concat.hash_pair(self.hash, &self.level[j << 1], &self.level[(j << 1) + 1])?;
        }
        Ok(())
    }
}

struct RecordTask<'a> {
    level: &'a [Digest],
    pairs: Vec<(usize, &'a mut [Proof])>,
    step: usize,
}

impl RecordTask<'_> {
    fn run(self) {
        for (pair, leaves) in self.pairs {
            record_pair(leaves, self.level, pair, self.step);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Executor<'p> {
    Sequential,
    Pool(&'p WorkerPool),
}

impl Executor<'_> {
    pub(crate) fn leaves<B: DataBlock + Sync>(&self, blocks: &[B], config: &Config) -> Result<Vec<Digest>, MerkleError> {
        let pool = match self {
            Executor::Sequential => return leaves_sequential(blocks, config),
            Executor::Pool(pool) => pool,
        };
        let mut leaves = vec![Digest::new(); blocks.len()];
        let tasks: Vec<LeafTask<'_, B>> = partition(leaves.iter_mut(), pool.workers())
            .into_iter()
            .map(|slots| LeafTask { blocks, slots, config })
            .collect();
        first_error(pool.map(LeafTask::run, tasks))?;
        Ok(leaves)
    }

    /// `parents[j] = H(level[2j] ++ level[2j+1])` for every `j`.
    fn fill_parents(&self, level: &[Digest], parents: &mut [Digest], config: &Config) -> Result<(), MerkleError> {
        let concat = config.concat();
        let hash = &*config.hash;
        match self {
            Executor::Sequential => {
                for (j, slot) in parents.iter_mut().enumerate() {
                    *slot = concat.hash_pair(hash, &level[j << 1], &level[(j << 1) + 1])?;
                }
                Ok(())
            }
            Executor::Pool(pool) => {
                let tasks: Vec<HashTask<'_>> = partition(parents.iter_mut(), pool.workers())
                    .into_iter()
                    .map(|parents| HashTask { level, parents, concat, hash })
                    .collect();
                first_error(pool.map(HashTask::run, tasks))
            }
        }
    }

    /// Next retained level, already balanced.
    pub(crate) fn next_level(&self, level: &[Digest], config: &Config) -> Result<Vec<Digest>, MerkleError> {
        let mut next = vec![Digest::new(); level.len() >> 1];
        self.fill_parents(level, &mut next, config)?;
        balance(&mut next);
        Ok(next)
    }

    /// Replace `buf` by its parent level, balanced. Sequentially this hashes
    /// in place; pooled workers write into `spare`, which is then swapped in.
    pub(crate) fn advance(&self, buf: &mut Vec<Digest>, spare: &mut Vec<Digest>, config: &Config) -> Result<(), MerkleError> {
        let half = buf.len() >> 1;
        match self {
            Executor::Sequential => {
                let concat = config.concat();
                for j in 0..half {
                    let parent = concat.hash_pair(&*config.hash, &buf[j << 1], &buf[(j << 1) + 1])?;
                    buf[j] = parent;
                }
                buf.truncate(half);
            }
            Executor::Pool(_) => {
                spare.clear();
                spare.resize(half, Digest::new());
                self.fill_parents(buf, spare, config)?;
                std::mem::swap(buf, spare);
            }
        }
        balance(buf);
        Ok(())
    }

    /// Append the level-`step` sibling of every leaf, given the balanced
    /// level whose nodes each cover `2^step` leaves.
    pub(crate) fn record(&self, proofs: &mut [Proof], level: &[Digest], step: usize) {
        let chunks = proofs.chunks_mut(2usize << step);
        match self {
            Executor::Sequential => {
                for (pair, leaves) in chunks.enumerate() {
                    record_pair(leaves, level, pair, step);
                }
            }
            Executor::Pool(pool) => {
                let tasks: Vec<RecordTask<'_>> = partition(chunks, pool.workers())
                    .into_iter()
                    .map(|pairs| RecordTask { level, pairs, step })
                    .collect();
                pool.map(RecordTask::run, tasks);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtree_hash::HashError;

    fn digests(n: u8) -> Vec<Digest> { (0..n).map(|i| vec![i; 4]).collect() }

    #[test]
    fn balance_duplicates_last_node() {
        let mut level = digests(3);
        balance(&mut level);
        assert_eq!(level.len(), 4);
        assert_eq!(level[3], level[2]);
        balance(&mut level);
        assert_eq!(level.len(), 4);
    }

    #[test]
    fn pooled_next_level_matches_sequential() {
        let pool = WorkerPool::new(3).unwrap();
        let cfg = Config::default();
        let mut level = digests(13);
        balance(&mut level);
        let seq = Executor::Sequential.next_level(&level, &cfg).unwrap();
        let par = Executor::Pool(&pool).next_level(&level, &cfg).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 8);
        assert_eq!(seq[7], seq[6]);
    }

    #[test]
    fn advance_in_place_and_ping_pong_agree() {
        let pool = WorkerPool::new(4).unwrap();
        let cfg = Config::default();
        let mut a = digests(10);
        let mut b = a.clone();
        let mut spare = Vec::new();
        while a.len() > 2 {
            Executor::Sequential.advance(&mut a, &mut Vec::new(), &cfg).unwrap();
            Executor::Pool(&pool).advance(&mut b, &mut spare, &cfg).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn pooled_record_matches_sequential() {
        let pool = WorkerPool::new(2).unwrap();
        let mut level = digests(7);
        balance(&mut level);
        let mut seq = vec![Proof::default(); 7];
        let mut par = seq.clone();
        Executor::Sequential.record(&mut seq, &level, 0);
        Executor::Pool(&pool).record(&mut par, &level, 0);
        assert_eq!(seq, par);
        assert_eq!(seq[6].siblings[0], level[6]);
    }

    #[test]
    fn pooled_hash_failure_is_reported() {
        let pool = WorkerPool::new(4).unwrap();
        let cfg = Config::default()
            .with_hash(|_: &[u8]| -> Result<Vec<u8>, HashError> { Err(HashError::new("unavailable")) });
        let level = digests(8);
        let err = Executor::Pool(&pool).next_level(&level, &cfg).unwrap_err();
        assert!(matches!(err, MerkleError::Hash(_)));
    }
}
