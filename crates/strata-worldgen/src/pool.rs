//! Scoped worker pool for the per-district and per-room stages.
//!
//! Jobs are indexed; workers pull them from a shared channel and send back
//! `(index, result)` pairs, which are reassembled in index order. Since every
//! job derives its own RNG from stable ids, the output is identical whether
//! the jobs run inline or on any number of threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;

use crate::error::GenerationError;

/// How pooled stages execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// Run every job inline on the calling thread.
    Sequential,
    /// Run jobs on this many worker threads; `0` means one per CPU.
    Threads(usize),
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Threads(0)
    }
}

impl Parallelism {
    /// Worker count for `jobs` jobs. Never more workers than jobs.
    pub fn worker_count(self, jobs: usize) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Threads(0) => num_cpus::get().max(1).min(jobs.max(1)),
            Parallelism::Threads(n) => n.min(jobs.max(1)),
        }
    }
}

/// Shared flag that aborts a run at the next checkpoint.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), GenerationError> {
        if self.is_cancelled() {
            Err(GenerationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run `work` over every job and return the results in job order.
///
/// Workers are named `{label}-{n}`. The token is checked before each job;
/// once it is set the remaining jobs are skipped and the whole batch is
/// discarded.
///
/// # Errors
///
/// [`GenerationError::Cancelled`] when the token was set during the batch.
pub fn run_indexed<T, R, F>(
    label: &str,
    jobs: Vec<T>,
    parallelism: Parallelism,
    cancel: &CancelToken,
    work: F,
) -> Result<Vec<R>, GenerationError>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
{
    let total = jobs.len();
    let workers = parallelism.worker_count(total);

    if workers <= 1 {
        let mut results = Vec::with_capacity(total);
        for (index, job) in jobs.into_iter().enumerate() {
            cancel.check()?;
            results.push(work(index, job));
        }
        return Ok(results);
    }

    let (job_sender, job_receiver) = unbounded::<(usize, T)>();
    let (result_sender, result_receiver) = unbounded::<(usize, R)>();
    for job in jobs.into_iter().enumerate() {
        // The receiver lives until the scope below ends.
        let _ = job_sender.send(job);
    }
    drop(job_sender);

    thread::scope(|scope| {
        for worker in 0..workers {
            let receiver = job_receiver.clone();
            let sender = result_sender.clone();
            let work = &work;

            thread::Builder::new()
                .name(format!("{label}-{worker}"))
                .spawn_scoped(scope, move || {
                    while let Ok((index, job)) = receiver.recv() {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if sender.send((index, work(index, job))).is_err() {
                            break;
                        }
                    }
                })
                .expect("Failed to spawn generation worker thread");
        }
    });
    drop(result_sender);

    cancel.check()?;

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    for (index, result) in result_receiver.try_iter() {
        slots[index] = Some(result);
    }
    let results: Option<Vec<R>> = slots.into_iter().collect();
    // A missing slot means a worker stopped early, which only cancellation does.
    results.ok_or(GenerationError::Cancelled)
}
