//! Fetcher trait and slot statistics.

use async_trait::async_trait;

use crate::error::CacheError;

/// Source of truth behind a [`QuerySlot`](crate::QuerySlot).
///
/// The fetcher receives the value currently cached so it can address the
/// request (a user refetch needs the cached id and token). Returning
/// `Ok(None)` empties the slot.
#[async_trait]
pub trait QueryFetcher<T>: Send + Sync {
    async fn fetch(&self, current: Option<T>) -> Result<Option<T>, CacheError>;
}

/// Counters describing what happened to a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    /// Direct writes through `set`.
    pub writes: u64,
    /// Calls to `invalidate`.
    pub invalidations: u64,
    /// Refetches that were still running when cancelled.
    pub cancellations: u64,
    /// Refetches whose result was written.
    pub refetches: u64,
    /// Refetches that failed; the cached value was kept.
    pub failed_refetches: u64,
    /// Refetch results dropped because the slot was cancelled or a newer
    /// refetch started.
    pub discarded_refetches: u64,
}

impl SlotStats {
    /// Total refetch attempts that completed one way or another.
    pub fn completed_refetches(&self) -> u64 {
        self.refetches + self.failed_refetches + self.discarded_refetches
    }
}
