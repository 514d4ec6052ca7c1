//! Worker pools for ordered parallel maps
//!
//! A pool is built fresh for each `map` call, sized to the host's
//! available parallelism unless pinned, and fully drained before the
//! call returns. Output order always matches input order. The first
//! failing item fails the whole call and partial results are dropped.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use rayon::prelude::*;
use tracing::debug;

use crate::bench::cancel::CancellationToken;
use crate::error::panic_message;
use crate::{ParbenchError, Result};

/// Execution unit backing a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Work-stealing compute pool for CPU-bound pure functions
    Compute,
    /// Dedicated OS threads over contiguous chunks, for light allocation-heavy work
    Threaded,
}

impl PoolKind {
    pub fn description(&self) -> &'static str {
        match self {
            PoolKind::Compute => "compute",
            PoolKind::Threaded => "threaded",
        }
    }
}

/// Available parallelism of the host, at least 1
pub fn default_parallelism() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Ordered map over a bounded collection using several workers
#[derive(Debug, Clone)]
pub struct WorkerPool {
    kind: PoolKind,
    threads: usize,
    cancel: Option<CancellationToken>,
}

impl WorkerPool {
    /// Create a pool sized to the available parallelism
    pub fn new(kind: PoolKind) -> Self {
        Self {
            kind,
            threads: default_parallelism(),
            cancel: None,
        }
    }

    /// Compute pool
    pub fn compute() -> Self {
        Self::new(PoolKind::Compute)
    }

    /// Thread pool
    pub fn threaded() -> Self {
        Self::new(PoolKind::Threaded)
    }

    /// Pin the worker count; `None` keeps the default
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        if let Some(n) = threads {
            self.threads = n.max(1);
        }
        self
    }

    /// Stop picking up items once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Apply `f` to every item, `output[i]` corresponding to `items[i]`
    pub fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        self.try_map(items, |item| Ok(f(item)))
    }

    /// Fallible variant of [`WorkerPool::map`]
    pub fn try_map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U> + Sync + Send,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            kind = self.kind.description(),
            threads = self.threads,
            items = items.len(),
            "fanning out"
        );

        let cancel = self.cancel.as_ref();
        let guarded = |item: T| -> Result<U> {
            if let Some(token) = cancel {
                token.check()?;
            }
            f(item)
        };

        let result = match self.kind {
            PoolKind::Compute => self.run_compute(items, &guarded),
            PoolKind::Threaded => self.run_threaded(items, &guarded),
        };

        debug!(kind = self.kind.description(), ok = result.is_ok(), "pool drained");
        result
    }

    fn run_compute<T, U, F>(&self, items: Vec<T>, f: &F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("parbench-compute-{}", i))
            .build()
            .map_err(|e| ParbenchError::Worker(format!("Failed to build compute pool: {}", e)))?;

        // install() returns only after every spawned job finished, panicking or not
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| items.into_par_iter().map(f).collect::<Result<Vec<U>>>())
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => Err(ParbenchError::Worker(format!(
                "compute worker panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    fn run_threaded<T, U, F>(&self, items: Vec<T>, f: &F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U> + Sync,
    {
        let total = items.len();
        let workers = self.threads.min(total).max(1);
        let chunk_len = (total + workers - 1) / workers;

        let mut chunks: Vec<Vec<T>> = Vec::with_capacity(workers);
        let mut rest = items.into_iter();
        loop {
            let chunk: Vec<T> = rest.by_ref().take(chunk_len).collect();
            if chunk.is_empty() {
                break;
            }
            chunks.push(chunk);
        }

        thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .enumerate()
                .map(|(i, chunk)| {
                    thread::Builder::new()
                        .name(format!("parbench-worker-{}", i))
                        .spawn_scoped(scope, move || {
                            chunk.into_iter().map(f).collect::<Result<Vec<U>>>()
                        })
                })
                .collect();

            // Join every worker before reporting, keeping the first error
            let mut output = Vec::with_capacity(total);
            let mut first_error = None;
            for handle in handles {
                let part = match handle {
                    Ok(handle) => match handle.join() {
                        Ok(part) => part,
                        Err(payload) => Err(ParbenchError::Worker(format!(
                            "thread worker panicked: {}",
                            panic_message(payload.as_ref())
                        ))),
                    },
                    Err(e) => Err(ParbenchError::Worker(format!(
                        "Failed to spawn worker thread: {}",
                        e
                    ))),
                };

                match part {
                    Ok(values) if first_error.is_none() => output.extend(values),
                    Ok(_) => {}
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(output),
            }
        })
    }
}
