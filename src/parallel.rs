//! Fork-join decomposition of the index range.
//!
//! A run is split into a [`Plan`]: a rule assigning index ranges to each
//! worker. Ranges are generated on demand by [`WorkerRanges`], so a plan costs
//! the same memory whatever the chunk size. The plan is executed on a rayon
//! pool with one thread per planned worker that is built for the run and
//! dropped before it returns. Partial sums are combined in one of two
//! race-free ways:
//!
//! - [`fork_join`] collects one partial per worker and adds them in worker
//!   order, so repeated runs return identical bits.
//! - [`fork_join_shared`] merges every partial into a [`SharedSum`] through a
//!   lock-free compare-and-swap add, so the merge order follows completion order.

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::{
    config::Schedule,
    error::{thread_count_error, Result},
    float::SeriesFloat,
};

/// Assignment of `0..terms` to workers.
///
/// Every range boundary except `terms` is a multiple of the kernel width, so
/// only the range ending at `terms` can have a partial kernel iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    terms: u64,
    workers: usize,
    width: u64,
    schedule: Schedule,
}

impl Plan {
    /// Splits `0..terms` across at most `threads` workers.
    ///
    /// Workers that would receive no terms are not planned: a blocked plan has
    /// at most one worker per kernel iteration, a static plan at most one per
    /// chunk. There is always at least one worker.
    pub fn new(terms: u64, threads: usize, width: u64, schedule: Schedule) -> Self {
        let width = width.max(1);

        let units = match schedule {
            Schedule::Blocked => terms.div_ceil(width),
            Schedule::Static { chunk } => terms.div_ceil(chunk.get()),
        };
        let workers = usize::try_from(units)
            .map_or(threads, |units| threads.min(units))
            .max(1);

        Self {
            terms,
            workers,
            width,
            schedule,
        }
    }

    /// Number of planned workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Total number of non-empty ranges across all workers.
    pub fn range_count(&self) -> u64 {
        match self.schedule {
            Schedule::Blocked if self.terms == 0 => 0,
            Schedule::Blocked => self.workers as u64,
            Schedule::Static { chunk } => self.terms.div_ceil(chunk.get()),
        }
    }

    /// Ranges owned by `worker`, in the order the worker sums them.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `worker` is not below [`Plan::workers`].
    pub fn ranges(&self, worker: usize) -> WorkerRanges {
        debug_assert!(worker < self.workers, "Worker index out of range");

        let w = worker as u64;
        let t = self.workers as u64;

        match self.schedule {
            Schedule::Blocked => {
                let blocks = self.terms / self.width;
                let base = blocks / t;
                let extra = blocks % t;

                let boundary = |w: u64| -> u64 {
                    if w == t {
                        self.terms
                    } else {
                        self.width * (w * base + w.min(extra))
                    }
                };

                let (start, end) = (boundary(w), boundary(w + 1));
                WorkerRanges {
                    next: start,
                    end,
                    len: end - start,
                    stride: u64::MAX,
                }
            }
            Schedule::Static { chunk } => WorkerRanges {
                next: w.saturating_mul(chunk.get()),
                end: self.terms,
                len: chunk.get(),
                stride: t.saturating_mul(chunk.get()),
            },
        }
    }
}

/// Lazily generated ranges of one worker: `len`-term ranges starting at
/// `next`, `next + stride`, ... and clipped to `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRanges {
    next: u64,
    end: u64,
    len: u64,
    stride: u64,
}

impl Iterator for WorkerRanges {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        let start = self.next;
        let stop = start.saturating_add(self.len).min(self.end);
        self.next = start.saturating_add(self.stride);

        Some(start..stop)
    }
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("leibniz-worker-{i}"))
        .build()
        .map_err(|e| thread_count_error(threads, e.to_string()))
}

/// Runs `worker` for every worker of `plan` and adds the partial sums in worker order.
///
/// # Errors
///
/// Returns [`InvalidThreadCount`](crate::error::LeibnizError::InvalidThreadCount)
/// if the pool cannot be built.
pub fn fork_join<T, F>(plan: &Plan, worker: F) -> Result<T>
where
    T: SeriesFloat,
    F: Fn(WorkerRanges) -> T + Sync,
{
    let pool = build_pool(plan.workers())?;

    debug!(
        workers = plan.workers(),
        ranges = plan.range_count(),
        "fork-join with collected partials"
    );

    let partials: Vec<T> = pool.install(|| {
        (0..plan.workers())
            .into_par_iter()
            .map(|w| worker(plan.ranges(w)))
            .collect()
    });

    Ok(partials.into_iter().fold(T::zero(), |acc, partial| acc + partial))
}

/// Runs `worker` for every worker of `plan`, merging each partial into a
/// shared atomic accumulator as soon as the worker finishes.
///
/// # Errors
///
/// Returns [`InvalidThreadCount`](crate::error::LeibnizError::InvalidThreadCount)
/// if the pool cannot be built.
pub fn fork_join_shared<T, F>(plan: &Plan, worker: F) -> Result<T>
where
    T: SeriesFloat,
    F: Fn(WorkerRanges) -> T + Sync,
{
    let pool = build_pool(plan.workers())?;

    debug!(
        workers = plan.workers(),
        ranges = plan.range_count(),
        "fork-join with atomic merge"
    );

    let total = SharedSum::<T>::new();

    pool.install(|| {
        (0..plan.workers())
            .into_par_iter()
            .for_each(|w| total.add(worker(plan.ranges(w))));
    });

    Ok(total.into_inner())
}

/// A float accumulator many threads can add to.
///
/// The value is stored as raw bits in an `AtomicU64` and updated with a
/// compare-and-swap loop, so no addition is ever lost.
#[derive(Debug)]
pub struct SharedSum<T> {
    bits: AtomicU64,
    _marker: PhantomData<T>,
}

impl<T: SeriesFloat> SharedSum<T> {
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(T::zero().to_bits_u64()),
            _marker: PhantomData,
        }
    }

    /// Atomically adds `value`.
    pub fn add(&self, value: T) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (T::from_bits_u64(current) + value).to_bits_u64();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn load(&self) -> T {
        T::from_bits_u64(self.bits.load(Ordering::Acquire))
    }

    pub fn into_inner(self) -> T {
        T::from_bits_u64(self.bits.into_inner())
    }
}

impl<T: SeriesFloat> Default for SharedSum<T> {
    fn default() -> Self {
        Self::new()
    }
}
