//! Fan-out/fan-in worker groups
//!
//! A `WorkerGroup` launches one tokio task per unit of work and waits for all
//! of them. Results land in a slot per index and failures are collected in
//! completion order; the caller owns the resulting `PhaseOutcome`. A failing
//! sub-worker never cancels its siblings.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::ConcurrencyPolicy;
use crate::error::{BenchError, Result};

/// Spawns groups of sub-workers under a concurrency policy
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerGroup {
    policy: ConcurrencyPolicy,
}

impl WorkerGroup {
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Run `count` sub-workers and wait for every one of them
    pub async fn run<T, F, Fut>(&self, count: usize, make: F) -> PhaseOutcome<T>
    where
        T: Send + 'static,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.spawn(count, make).join().await
    }

    /// Launch `count` sub-workers without waiting for them
    ///
    /// Must be called from within a tokio runtime. Dropping the returned
    /// `PendingGroup` without joining aborts whatever is still running.
    pub fn spawn<T, F, Fut>(&self, count: usize, mut make: F) -> PendingGroup<T>
    where
        T: Send + 'static,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let semaphore = self.policy.limit().map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();

        for index in 0..count {
            let work = make(index);
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only waits.
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                (index, work.await)
            });
        }

        PendingGroup { tasks, count }
    }
}

/// Sub-workers that were launched but not yet joined
pub struct PendingGroup<T> {
    tasks: JoinSet<(usize, Result<T>)>,
    count: usize,
}

impl<T: Send + 'static> PendingGroup<T> {
    /// Number of sub-workers launched
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Wait for every launched sub-worker to finish
    pub async fn join(mut self) -> PhaseOutcome<T> {
        let mut slots: Vec<Option<T>> = (0..self.count).map(|_| None).collect();
        let mut errors = Vec::new();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((index, Ok(value))) => slots[index] = Some(value),
                Ok((_, Err(e))) => errors.push(e),
                Err(e) => errors.push(BenchError::from(e)),
            }
        }

        PhaseOutcome { slots, errors }
    }
}

/// Results and failures of one phase, indexed by sub-worker
#[derive(Debug)]
pub struct PhaseOutcome<T> {
    /// One slot per sub-worker; `None` where it failed
    pub slots: Vec<Option<T>>,
    /// Failures in completion order
    pub errors: Vec<BenchError>,
}

impl<T> PhaseOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of sub-workers that produced a value
    pub fn succeeded(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn first_error(&self) -> Option<&BenchError> {
        self.errors.first()
    }

    /// Collapse into the slot values, or the first captured error
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.slots.into_iter().flatten().collect()),
        }
    }
}
