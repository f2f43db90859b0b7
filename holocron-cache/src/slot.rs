//! Single-slot query store.
//!
//! The slot keeps its value in a `watch` channel so UI readers can observe
//! writes, and its bookkeeping (staleness, in-flight refetch, counters)
//! behind a short-lived mutex. Every refetch is tagged with a generation;
//! `cancel` bumps the generation so a response that is already on its way
//! can never land on top of a later optimistic write.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use holocron_core::QueryKey;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::CacheError;
use crate::traits::{QueryFetcher, SlotStats};

/// Snapshot of a slot with its staleness metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry<T> {
    pub value: Option<T>,
    pub stale: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> SlotEntry<T> {
    /// Time since the value was last written, if it ever was.
    pub fn age(&self) -> Option<Duration> {
        self.updated_at.map(|at| {
            Utc::now()
                .signed_duration_since(at)
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }
}

#[derive(Default)]
struct SlotState {
    stale: bool,
    updated_at: Option<DateTime<Utc>>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    stats: SlotStats,
}

struct Shared<T> {
    sender: watch::Sender<Option<T>>,
    state: Mutex<SlotState>,
    fetcher: Option<Arc<dyn QueryFetcher<T>>>,
}

/// Cache slot for one logical query.
///
/// Cloning is cheap and every clone refers to the same slot.
pub struct QuerySlot<T> {
    key: QueryKey,
    shared: Arc<Shared<T>>,
}

impl<T> Clone for QuerySlot<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> QuerySlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a slot that can be written and invalidated but never refetches.
    pub fn new(key: QueryKey) -> Self {
        Self::build(key, None)
    }

    /// Create a slot backed by `fetcher` for refetches.
    pub fn with_fetcher(key: QueryKey, fetcher: Arc<dyn QueryFetcher<T>>) -> Self {
        Self::build(key, Some(fetcher))
    }

    fn build(key: QueryKey, fetcher: Option<Arc<dyn QueryFetcher<T>>>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            key,
            shared: Arc::new(Shared {
                sender,
                state: Mutex::new(SlotState::default()),
                fetcher,
            }),
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// Current value.
    pub fn get(&self) -> Option<T> {
        self.shared.sender.borrow().clone()
    }

    /// Write a value. Readers observe it immediately.
    pub fn set(&self, value: Option<T>) {
        let mut state = self.state();
        state.stale = false;
        state.updated_at = Some(Utc::now());
        state.stats.writes += 1;
        self.shared.sender.send_replace(value);
    }

    /// Receiver that is notified on every write.
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.shared.sender.subscribe()
    }

    pub fn entry(&self) -> SlotEntry<T> {
        let state = self.state();
        SlotEntry {
            value: self.get(),
            stale: state.stale,
            updated_at: state.updated_at,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.state().stale
    }

    pub fn stats(&self) -> SlotStats {
        self.state().stats
    }

    /// Cancel an outstanding refetch. Returns whether one was still running.
    ///
    /// Any refetch started before this call, spawned or awaited, has its
    /// result discarded.
    pub fn cancel(&self) -> bool {
        let mut state = self.state();
        state.generation += 1;
        let Some(handle) = state.in_flight.take() else {
            return false;
        };
        let active = !handle.is_finished();
        handle.abort();
        if active {
            state.stats.cancellations += 1;
            tracing::debug!(key = %self.key, "cancelled in-flight refetch");
        }
        active
    }

    /// Mark the value stale and schedule a background refetch.
    ///
    /// The refetch only runs when the slot has a fetcher and a tokio runtime
    /// is available; otherwise the slot just stays stale until the next
    /// explicit [`QuerySlot::refetch`].
    pub fn invalidate(&self) {
        {
            let mut state = self.state();
            state.stale = true;
            state.stats.invalidations += 1;
        }
        tracing::debug!(key = %self.key, "cache slot invalidated");
        self.schedule_refetch();
    }

    /// Fetch now and write the result.
    pub async fn refetch(&self) -> Result<Option<T>, CacheError> {
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.generation
        };
        self.run_fetch(generation).await
    }

    fn schedule_refetch(&self) {
        if self.shared.fetcher.is_none() {
            return;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::debug!(key = %self.key, "no runtime available, refetch deferred");
                return;
            }
        };

        let mut state = self.state();
        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.generation += 1;
        let generation = state.generation;
        let slot = self.clone();
        state.in_flight = Some(runtime.spawn(async move {
            // Failures are recorded in the slot stats and logged.
            let _ = slot.run_fetch(generation).await;
        }));
    }

    async fn run_fetch(&self, generation: u64) -> Result<Option<T>, CacheError> {
        let fetcher = self
            .shared
            .fetcher
            .clone()
            .ok_or(CacheError::NoFetcher { key: self.key })?;

        let result = fetcher.fetch(self.get()).await;

        let mut state = self.state();
        if state.generation != generation {
            state.stats.discarded_refetches += 1;
            tracing::debug!(key = %self.key, "discarding superseded refetch result");
            return Err(CacheError::Cancelled { key: self.key });
        }

        match result {
            Ok(value) => {
                state.stale = false;
                state.updated_at = Some(Utc::now());
                state.stats.refetches += 1;
                self.shared.sender.send_replace(value.clone());
                Ok(value)
            }
            Err(err) => {
                state.stats.failed_refetches += 1;
                tracing::warn!(key = %self.key, error = %err, "refetch failed, keeping cached value");
                Err(err)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
