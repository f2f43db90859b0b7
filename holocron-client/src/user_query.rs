//! Cached query for the signed-in user.

use std::sync::Arc;

use async_trait::async_trait;
use holocron_cache::{CacheError, QueryFetcher, QuerySlot};
use holocron_core::{QueryKey, UserRecord};

use crate::api_client::UserApi;

/// Refetches the cached user from the server using the cached id and token.
pub struct UserFetcher<A: ?Sized> {
    api: Arc<A>,
}

impl<A: ?Sized> UserFetcher<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A> QueryFetcher<UserRecord> for UserFetcher<A>
where
    A: UserApi + ?Sized + 'static,
{
    async fn fetch(&self, current: Option<UserRecord>) -> Result<Option<UserRecord>, CacheError> {
        // Signed out: nothing to load.
        let Some(user) = current else {
            return Ok(None);
        };
        self.api
            .get_user(&user)
            .await
            .map(Some)
            .map_err(|err| CacheError::Fetch {
                key: QueryKey::USER,
                reason: err.to_string(),
            })
    }
}

/// Slot for the signed-in user, refetched through `api`.
pub fn user_slot<A>(api: Arc<A>) -> QuerySlot<UserRecord>
where
    A: UserApi + ?Sized + 'static,
{
    QuerySlot::with_fetcher(QueryKey::USER, Arc::new(UserFetcher::new(api)))
}
