// File: mtree-merkle/src/proof.rs
use serde::{Deserialize, Serialize};

use crate::Digest;

/// Inclusion proof of one leaf.
///
/// Bit `i` of `path` is 1 when the subject was the left child at level `i`;
/// `siblings[i]` is the node it was paired with there, leaf level first.
/// The path is a `u32`, so trees are limited to 32 levels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub siblings: Vec<Digest>,
    pub path: u32,
}

impl Proof {
    pub(crate) fn with_depth(depth: usize) -> Self {
        Self { siblings: Vec::with_capacity(depth), path: 0 }
    }

    pub fn depth(&self) -> usize { self.siblings.len() }

    /// Whether the subject was the left child at `level`.
    pub fn is_left(&self, level: usize) -> bool { level < 32 && (self.path >> level) & 1 == 1 }
}

/// Record the siblings at level `step` for every leaf under the pair
/// `(level[2*pair], level[2*pair+1])`. `leaves` are the proofs of exactly those
/// leaves (fewer at the right edge, where the pair covers duplicated nodes).
pub(crate) fn record_pair(leaves: &mut [Proof], level: &[Digest], pair: usize, step: usize) {
    let batch = 1usize << step;
    let idx = pair << 1;
    for (k, proof) in leaves.iter_mut().enumerate() {
        if k < batch {
            proof.path |= 1 << step;
            proof.siblings.push(level[idx + 1].clone());
        } else {
            proof.siblings.push(level[idx].clone());
        }
    }
}

/// Proof of leaf `pos` read off the retained levels.
pub(crate) fn walk(levels: &[Vec<Digest>], mut pos: usize) -> Proof {
    let mut proof = Proof::with_depth(levels.len());
    for (i, level) in levels.iter().enumerate() {
        if pos & 1 == 1 {
            proof.siblings.push(level[pos - 1].clone());
        } else {
            proof.path |= 1 << i;
            proof.siblings.push(level[pos + 1].clone());
        }
        pos >>= 1;
    }
    proof
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(b: u8) -> Digest { vec![b] }

    #[test]
    fn record_pair_splits_left_and_right_halves() {
        // level 1 of a 6-leaf tree, pair 0 covers leaves 0..4
        let level = vec![d(10), d(11), d(12), d(12)];
        let mut proofs = vec![Proof::default(); 4];
        record_pair(&mut proofs, &level, 0, 1);
        assert!(proofs[0].is_left(1) && proofs[1].is_left(1));
        assert!(!proofs[2].is_left(1) && !proofs[3].is_left(1));
        assert_eq!(proofs[0].siblings, vec![d(11)]);
        assert_eq!(proofs[3].siblings, vec![d(10)]);
    }

    #[test]
    fn record_pair_right_edge_is_truncated() {
        let level = vec![d(1), d(2), d(3), d(3)];
        let mut proofs = vec![Proof::default(); 1];
        record_pair(&mut proofs, &level, 1, 0);
        assert_eq!(proofs[0].siblings, vec![d(3)]);
        assert_eq!(proofs[0].path, 1);
    }

    #[test]
    fn walk_reads_siblings_bottom_up() {
        let levels = vec![vec![d(0), d(1), d(2), d(2)], vec![d(20), d(21)]];
        let p = walk(&levels, 2);
        assert_eq!(p.siblings, vec![d(2), d(20)]);
        assert_eq!(p.path, 0b01);
        let p = walk(&levels, 1);
        assert_eq!(p.siblings, vec![d(0), d(21)]);
        assert_eq!(p.path, 0b10);
    }
}
