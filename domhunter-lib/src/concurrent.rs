//! Concurrency gate bounding in-flight domain pipelines.
//!
//! One gate is shared by every domain task of a batch. It bounds whole
//! pipelines, not the individual requests a pipeline issues.

use crate::error::HuntError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting gate shared by all domain tasks of a batch.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One occupied slot; released when dropped.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    /// Create a gate with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<GatePermit, HuntError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| HuntError::internal("concurrency gate closed"))?;
        Ok(GatePermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
