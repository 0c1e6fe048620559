//! Concurrency Limiter
//!
//! Counting semaphore bounding the number of probes in flight.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Limiter errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimiterError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("concurrency limiter is closed")]
    Closed,
}

/// Bounds simultaneously held slots to `max_concurrency`.
///
/// Cloning yields another handle to the same slot pool. Waiters are
/// served in FIFO order by the underlying semaphore.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `max_concurrency` slots.
    pub fn new(max_concurrency: usize) -> Result<Self, LimiterError> {
        if max_concurrency == 0 {
            return Err(LimiterError::ZeroConcurrency);
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        })
    }

    /// Wait until a slot is free and take it.
    ///
    /// The slot is released when the returned guard is dropped or
    /// passed to [`LimiterSlot::release`].
    pub async fn acquire(&self) -> Result<LimiterSlot, LimiterError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LimiterError::Closed)?;
        Ok(LimiterSlot { _permit: permit })
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<LimiterSlot> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| LimiterSlot { _permit: permit })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Number of slots currently held.
    pub fn in_flight(&self) -> usize {
        self.max_concurrency
            .saturating_sub(self.semaphore.available_permits())
    }

    /// Close the limiter. Pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}

/// RAII guard for a held slot.
#[derive(Debug)]
pub struct LimiterSlot {
    _permit: OwnedSemaphorePermit,
}

impl LimiterSlot {
    /// Give the slot back.
    pub fn release(self) {}
}
