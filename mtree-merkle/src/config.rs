// File: mtree-merkle/src/config.rs
use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use mtree_hash::{Concat, HashAlgorithm, HashFunction};

use crate::MerkleError;

/// What a construction computes and keeps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Stream the levels, keep only the root and every leaf's proof.
    #[default]
    ProofGen,
    /// Keep every level and the leaf index; proofs are derived on demand.
    TreeBuild,
    /// Keep the tree and derive every proof eagerly.
    ProofGenAndTreeBuild,
}

impl Mode {
    pub fn retains_tree(self) -> bool { !matches!(self, Mode::ProofGen) }
    pub fn generates_proofs(self) -> bool { !matches!(self, Mode::TreeBuild) }

    pub fn name(self) -> &'static str {
        match self {
            Mode::ProofGen => "proof-gen",
            Mode::TreeBuild => "tree-build",
            Mode::ProofGenAndTreeBuild => "proof-gen-and-tree-build",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Mode {
    type Err = MerkleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proof-gen" => Ok(Mode::ProofGen),
            "tree-build" => Ok(Mode::TreeBuild),
            "proof-gen-and-tree-build" => Ok(Mode::ProofGenAndTreeBuild),
            _ => Err(MerkleError::invalid(format!("invalid configuration mode: {s}"))),
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = MerkleError;
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Mode::ProofGen),
            1 => Ok(Mode::TreeBuild),
            2 => Ok(Mode::ProofGenAndTreeBuild),
            _ => Err(MerkleError::invalid(format!("invalid configuration mode: {code}"))),
        }
    }
}

/// Tree configuration. Fixed once a tree has been constructed with it; the
/// same hash and pair ordering must be used again to verify its proofs.
#[derive(Clone)]
pub struct Config {
    pub hash: Arc<dyn HashFunction>,
    /// Pool size when `parallel` is set; 0 picks the hardware parallelism.
    pub workers: usize,
    pub mode: Mode,
    pub parallel: bool,
    /// Sort each sibling pair before hashing (OpenZeppelin-style trees).
    pub sort_sibling_pairs: bool,
    /// Use the serialized block itself as the leaf.
    pub disable_leaf_hashing: bool,
}

impl Config {
    pub fn with_hash<H: HashFunction + 'static>(mut self, hash: H) -> Self {
        self.hash = Arc::new(hash);
        self
    }

    #[inline]
    pub fn concat(&self) -> Concat { Concat::from_sort_flag(self.sort_sibling_pairs) }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash: Arc::new(HashAlgorithm::default()),
            workers: 0,
            mode: Mode::default(),
            parallel: false,
            sort_sibling_pairs: false,
            disable_leaf_hashing: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("workers", &self.workers)
            .field("mode", &self.mode)
            .field("parallel", &self.parallel)
            .field("sort_sibling_pairs", &self.sort_sibling_pairs)
            .field("disable_leaf_hashing", &self.disable_leaf_hashing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_codes_and_names() {
        for (code, mode) in [(0u8, Mode::ProofGen), (1, Mode::TreeBuild), (2, Mode::ProofGenAndTreeBuild)] {
            assert_eq!(Mode::try_from(code).unwrap(), mode);
            assert_eq!(mode.name().parse::<Mode>().unwrap(), mode);
        }
        assert!(matches!(Mode::try_from(3), Err(MerkleError::InvalidInput(_))));
        assert!(matches!("tree".parse::<Mode>(), Err(MerkleError::InvalidInput(_))));
    }

    #[test]
    fn mode_flags() {
        assert!(!Mode::ProofGen.retains_tree() && Mode::ProofGen.generates_proofs());
        assert!(Mode::TreeBuild.retains_tree() && !Mode::TreeBuild.generates_proofs());
        assert!(Mode::ProofGenAndTreeBuild.retains_tree() && Mode::ProofGenAndTreeBuild.generates_proofs());
    }

    #[test]
    fn concat_follows_sort_flag() {
        let mut cfg = Config::default();
        assert_eq!(cfg.concat(), Concat::Ordered);
        cfg.sort_sibling_pairs = true;
        assert_eq!(cfg.concat(), Concat::Sorted);
    }
}
