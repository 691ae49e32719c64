//! Fixed-capacity worker pool for job pipelines.
//!
//! A semaphore bounds how many submitted futures run at once; everything
//! beyond capacity queues unbounded. Submissions are manual triggers, not
//! high-QPS traffic, so an unbounded queue is acceptable.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Maximum concurrent jobs.
    pub capacity: usize,
    /// Jobs currently executing.
    pub active: u64,
    /// Jobs waiting for a free slot.
    pub queued: u64,
}

/// Bounded executor for job futures.
#[derive(Clone)]
pub struct WorkerPool {
    capacity: usize,
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicU64>,
    queued: Arc<AtomicU64>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            active: Arc::new(AtomicU64::new(0)),
            queued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue a future. Returns immediately; the future starts once a
    /// slot frees up. There is no cancellation once started.
    pub fn spawn<F>(&self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let active = Arc::clone(&self.active);
        let queued = Arc::clone(&self.queued);

        queued.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            let permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    // The semaphore is never closed; this is unreachable
                    // but must not panic a worker.
                    error!("worker pool semaphore closed, dropping job");
                    queued.fetch_sub(1, Ordering::Relaxed);
                    return;
                }
            };
            queued.fetch_sub(1, Ordering::Relaxed);
            active.fetch_add(1, Ordering::Relaxed);

            future.await;

            active.fetch_sub(1, Ordering::Relaxed);
            drop(permit);
        });
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            capacity: self.capacity,
            active: self.active.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
        }
    }
}
