// File: mtree-pool/src/lib.rs
//! Fixed-size worker pool plus the strided partitioning used to hand out
//! disjoint index sets to its workers.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to start worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

/// Number of hardware threads, at least 1.
pub fn hardware_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Workers actually used for `len` items: never more workers than items,
/// never zero.
#[inline]
pub fn worker_count(requested: usize, len: usize) -> usize {
    requested.min(len).max(1)
}

pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Spawn `workers` OS threads; `0` means one per hardware thread.
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        let workers = if workers == 0 { hardware_parallelism() } else { workers };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mtree-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize { self.workers }

    /// Run `handler` once per argument record; results come back in
    /// submission order regardless of scheduling.
    pub fn map<A, R, F>(&self, handler: F, args: Vec<A>) -> Vec<R>
    where
        A: Send,
        R: Send,
        F: Fn(A) -> R + Send + Sync,
    {
        self.pool.install(move || args.into_par_iter().map(handler).collect())
    }

    /// Run two closures concurrently on the pool and wait for both.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.join(a, b)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("workers", &self.workers).finish()
    }
}

/// Residue-class split of `0..len`: bucket `w` holds `w, w+W, w+2W, ...`
/// with `W = worker_count(workers, len)`.
pub fn stride(len: usize, workers: usize) -> Vec<Vec<usize>> {
    let w = worker_count(workers, len);
    (0..w).map(|start| (start..len).step_by(w).collect()).collect()
}

/// Same split as [`stride`], but moves the items themselves (typically
/// `&mut` slots of a shared buffer) into the buckets, tagged with their index.
pub fn partition<T, I>(items: I, workers: usize) -> Vec<Vec<(usize, T)>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    let w = worker_count(workers, items.len());
    let mut buckets: Vec<Vec<(usize, T)>> = (0..w).map(|_| Vec::new()).collect();
    for (i, item) in items.enumerate() {
        buckets[i % w].push((i, item));
    }
    buckets
}
