//! Synchronous fan-out/fan-in over index ranges.
//!
//! Every call blocks until the whole batch has finished, so a batch's output
//! is complete and no worker still borrows it once the call returns. Stages
//! are ordered simply by calling them one after another.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::Result;
use crate::params::DispatchParams;

/// Frame worker pool with an inline fallback for small batches
pub struct Dispatcher {
    pool: ThreadPool,
    parallel_threshold: usize,
}

impl Dispatcher {
    /// Create a dedicated pool sized by `params`
    pub fn new(params: &DispatchParams) -> Result<Self> {
        params.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(params.worker_threads)
            .thread_name(|i| format!("bandwave-worker-{}", i))
            .build()?;

        debug!(
            "Dispatcher created: workers={}, parallel_threshold={}",
            pool.current_num_threads(),
            params.parallel_threshold
        );

        Ok(Self {
            pool,
            parallel_threshold: params.parallel_threshold,
        })
    }

    /// Number of worker threads in the pool
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task(index, item)` once per element and wait for all of them
    pub fn for_each_mut<T, F>(&self, items: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        if items.len() < self.parallel_threshold {
            for (index, item) in items.iter_mut().enumerate() {
                task(index, item);
            }
            return;
        }

        let grain = self.grain(items.len());
        self.pool.install(|| {
            items
                .par_iter_mut()
                .with_min_len(grain)
                .enumerate()
                .for_each(|(index, item)| task(index, item));
        });
    }

    /// Run `task(chunk_index, chunk)` over consecutive `chunk_size` slices and wait
    ///
    /// A trailing partial chunk is ignored; callers size buffers to a multiple
    /// of `chunk_size`.
    pub fn for_each_chunk_mut<T, F>(&self, items: &mut [T], chunk_size: usize, task: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        let chunks = items.len() / chunk_size.max(1);
        if chunks < self.parallel_threshold {
            for (index, chunk) in items.chunks_exact_mut(chunk_size).enumerate() {
                task(index, chunk);
            }
            return;
        }

        let grain = self.grain(chunks);
        self.pool.install(|| {
            items
                .par_chunks_exact_mut(chunk_size)
                .with_min_len(grain)
                .enumerate()
                .for_each(|(index, chunk)| task(index, chunk));
        });
    }

    /// Tasks per split: roughly four splits per worker
    fn grain(&self, len: usize) -> usize {
        (len / (self.worker_count() * 4).max(1)).max(1)
    }
}
