// File: mtree-merkle/src/index.rs
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Digest;

/// Leaf bytes -> original leaf position. Populated once, read-only after.
/// Identical leaves map to the last position holding them.
#[derive(Debug, Default)]
pub struct LeafIndex {
    map: Mutex<HashMap<Digest, usize>>,
}

impl LeafIndex {
    pub fn build(leaves: &[Digest]) -> Self {
        let index = Self::default();
        {
            let mut map = index.lock();
            map.reserve(leaves.len());
            for (i, leaf) in leaves.iter().enumerate() {
                map.insert(leaf.clone(), i);
            }
        }
        index
    }

    pub fn get(&self, leaf: &[u8]) -> Option<usize> { self.lock().get(leaf).copied() }

    pub fn len(&self) -> usize { self.lock().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn lock(&self) -> MutexGuard<'_, HashMap<Digest, usize>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
