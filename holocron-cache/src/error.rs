//! Cache errors.

use holocron_core::QueryKey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Fetch for {key} failed: {reason}")]
    Fetch { key: QueryKey, reason: String },
    #[error("No fetcher registered for {key}")]
    NoFetcher { key: QueryKey },
    #[error("Fetch for {key} was cancelled")]
    Cancelled { key: QueryKey },
}
