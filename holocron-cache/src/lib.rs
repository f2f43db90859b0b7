//! Query cache for HOLOCRON clients.
//!
//! A [`QuerySlot`] holds the latest known value of one logical query (for
//! example the signed-in user). It is an owned object handed to whoever
//! reads or writes it, not ambient global state.
//!
//! # Example
//!
//! ```ignore
//! let slot = QuerySlot::with_fetcher(QueryKey::USER, Arc::new(UserFetcher::new(api)));
//!
//! // Optimistic write; readers see it at once.
//! slot.cancel();
//! let previous = slot.get();
//! slot.set(Some(edited));
//!
//! // Later: mark stale and refresh in the background.
//! slot.invalidate();
//! ```

pub mod error;
pub mod slot;
pub mod traits;

pub use error::CacheError;
pub use slot::{QuerySlot, SlotEntry};
pub use traits::{QueryFetcher, SlotStats};
