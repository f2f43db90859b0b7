//! HOLOCRON client library exports.

pub mod api_client;
pub mod infinite;
pub mod mutation;
pub mod notifications;
pub mod user_query;

pub use api_client::{ApiClientError, PageSource, RestClient, UserApi};
pub use infinite::{InfiniteQuery, PageRequest};
pub use mutation::{patch_user_on_server, MutationError, MutationState, PatchUserMutation};
pub use notifications::{Notification, NotificationLevel, Notifier};
pub use user_query::{user_slot, UserFetcher};
