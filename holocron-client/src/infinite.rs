//! Paginated ("infinite") query state.
//!
//! The query is a plain state machine so a UI can run the request wherever
//! it likes: [`InfiniteQuery::begin`] hands out the next [`PageRequest`] and
//! [`InfiniteQuery::complete`] folds the response back in. Pages are kept in
//! arrival order and the query stops once a page omits `next`.

use holocron_core::{Page, QueryKey};

use crate::api_client::{ApiClientError, PageSource};

/// A page fetch handed out by [`InfiniteQuery::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub key: QueryKey,
    pub url: String,
    /// Number of pages loaded when the request was issued.
    pub page_index: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct InfiniteQuery<T> {
    key: QueryKey,
    initial_url: String,
    pages: Vec<Page<T>>,
    fetching: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> InfiniteQuery<T> {
    pub fn new(key: QueryKey, initial_url: impl Into<String>) -> Self {
        Self {
            key,
            initial_url: initial_url.into(),
            pages: Vec::new(),
            fetching: false,
            error: None,
            generation: 0,
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// Next request to issue, if any.
    ///
    /// Returns `None` while a fetch is running or after the last page.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if self.fetching {
            return None;
        }
        let url = match self.pages.last() {
            None => self.initial_url.clone(),
            Some(last) => last.next_url()?.to_string(),
        };
        self.fetching = true;
        Some(PageRequest {
            key: self.key,
            url,
            page_index: self.pages.len(),
            generation: self.generation,
        })
    }

    /// Fold the outcome of `request` into the query.
    ///
    /// Returns `false` when the request was superseded by a [`reset`](Self::reset)
    /// and its result was ignored.
    pub fn complete(&mut self, request: &PageRequest, result: Result<Page<T>, String>) -> bool {
        if request.generation != self.generation || request.page_index != self.pages.len() {
            tracing::debug!(key = %self.key, url = %request.url, "ignoring stale page response");
            return false;
        }
        self.fetching = false;
        match result {
            Ok(page) => {
                tracing::debug!(
                    key = %self.key,
                    page = request.page_index,
                    items = page.results.len(),
                    has_next = page.next_url().is_some(),
                    "page loaded"
                );
                self.pages.push(page);
                self.error = None;
            }
            Err(reason) => {
                tracing::warn!(key = %self.key, url = %request.url, %reason, "page fetch failed");
                self.error = Some(reason);
            }
        }
        true
    }

    /// Drop all pages and start over from the initial URL.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.fetching = false;
        self.error = None;
        self.generation += 1;
    }

    /// Fetch the next page (the first one if nothing is loaded) from `source`.
    ///
    /// Returns whether a request was made.
    pub async fn fetch_next_page<S>(&mut self, source: &S) -> Result<bool, ApiClientError>
    where
        S: PageSource<T> + ?Sized,
    {
        let Some(request) = self.begin() else {
            return Ok(false);
        };
        match source.fetch_page(&request.url).await {
            Ok(page) => {
                self.complete(&request, Ok(page));
                Ok(true)
            }
            Err(err) => {
                self.complete(&request, Err(err.to_string()));
                Err(err)
            }
        }
    }

    /// True when the last loaded page links to another one.
    pub fn has_next_page(&self) -> bool {
        self.pages
            .last()
            .is_some_and(|page| page.next_url().is_some())
    }

    /// No page yet and the first one is on its way.
    pub fn is_loading(&self) -> bool {
        self.pages.is_empty() && self.fetching
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    /// All loaded items, page by page in arrival order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.results.iter())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.results.len()).sum()
    }
}
