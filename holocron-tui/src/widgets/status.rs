//! Loading / error state of a paginated list.

use holocron_client::InfiniteQuery;

pub const LOADING_TEXT: &str = "Loading...";
pub const ERROR_TEXT: &str = "Error...";
pub const FETCHING_MORE_TEXT: &str = "Fetching more...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    /// First page on its way.
    Loading,
    /// Nothing loaded and the last fetch failed.
    Failed(String),
    /// Items are available; trailing line to show under them, if any.
    Ready(Option<Trailer>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailer {
    FetchingMore,
    Error,
}

impl ListStatus {
    pub fn of<T>(query: &InfiniteQuery<T>) -> Self {
        if query.is_loading() {
            return ListStatus::Loading;
        }
        if query.item_count() == 0 {
            if let Some(reason) = query.error() {
                return ListStatus::Failed(reason.to_string());
            }
        }
        let trailer = if query.is_fetching() {
            Some(Trailer::FetchingMore)
        } else if query.is_error() {
            Some(Trailer::Error)
        } else {
            None
        };
        ListStatus::Ready(trailer)
    }
}

impl Trailer {
    pub fn text(&self) -> &'static str {
        match self {
            Trailer::FetchingMore => FETCHING_MORE_TEXT,
            Trailer::Error => ERROR_TEXT,
        }
    }
}
