//! Optimistic user patch flow.
//!
//! A mutation moves through `Idle → Pending → {Success, Error} → Settled`:
//!
//! - entering `Pending` cancels any refetch of the user slot, captures the
//!   cached value as the rollback snapshot and writes the edited record into
//!   the slot at once;
//! - the diff between snapshot and edit is sent to the server;
//! - `Success` overwrites the slot with the server's record, `Error` restores
//!   the snapshot;
//! - `Settled` always invalidates the slot so the next read matches the
//!   server.

use std::sync::{Arc, Mutex, PoisonError};

use holocron_cache::QuerySlot;
use holocron_core::{diff_records, UserRecord};
use tokio::task::JoinHandle;

use crate::api_client::{ApiClientError, UserApi};
use crate::notifications::{Notification, Notifier};

pub const UPDATED_MESSAGE: &str = "User updated!";
pub const UPDATE_FAILED_MESSAGE: &str = "Update failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
    Success,
    Error,
    Settled,
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("User update rejected: {0}")]
    Rejected(#[from] ApiClientError),
}

/// Send the difference between `original` and `new` to the server.
///
/// Either snapshot missing means there is nothing to send; this resolves to
/// `Ok(None)` without touching the network.
pub async fn patch_user_on_server<A>(
    api: &A,
    new: Option<&UserRecord>,
    original: Option<&UserRecord>,
) -> Result<Option<UserRecord>, ApiClientError>
where
    A: UserApi + ?Sized,
{
    let (Some(new), Some(original)) = (new, original) else {
        return Ok(None);
    };
    let patch = diff_records(original, new);
    api.patch_user(original, &patch).await.map(Some)
}

pub struct PatchUserMutation<A: ?Sized, N: ?Sized> {
    slot: QuerySlot<UserRecord>,
    api: Arc<A>,
    notifier: Arc<N>,
    state: Arc<Mutex<MutationState>>,
}

impl<A: ?Sized, N: ?Sized> Clone for PatchUserMutation<A, N> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, N> PatchUserMutation<A, N>
where
    A: UserApi + ?Sized + 'static,
    N: Notifier + ?Sized + 'static,
{
    pub fn new(slot: QuerySlot<UserRecord>, api: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            slot,
            api,
            notifier,
            state: Arc::new(Mutex::new(MutationState::Idle)),
        }
    }

    pub fn state(&self) -> MutationState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the full optimistic update for `new`.
    ///
    /// The outcome is also reported through the notifier; the returned
    /// value is the server's record (or `None` when nothing was sent).
    pub async fn mutate(
        &self,
        new: Option<UserRecord>,
    ) -> Result<Option<UserRecord>, MutationError> {
        let previous = self.begin(new.clone());

        let result =
            patch_user_on_server(self.api.as_ref(), new.as_ref(), previous.as_ref()).await;

        let outcome = match result {
            Ok(user) => {
                self.succeed(previous.as_ref(), user.clone());
                Ok(user)
            }
            Err(err) => {
                self.fail(previous, &err);
                Err(MutationError::from(err))
            }
        };

        self.settle();
        outcome
    }

    /// Run [`PatchUserMutation::mutate`] on a background task.
    pub fn spawn(
        &self,
        new: Option<UserRecord>,
    ) -> JoinHandle<Result<Option<UserRecord>, MutationError>> {
        let mutation = self.clone();
        tokio::spawn(async move { mutation.mutate(new).await })
    }

    /// Enter `Pending`; returns the rollback snapshot.
    fn begin(&self, new: Option<UserRecord>) -> Option<UserRecord> {
        self.transition(MutationState::Pending);
        self.slot.cancel();
        let previous = self.slot.get();
        self.slot.set(new);
        previous
    }

    fn succeed(&self, previous: Option<&UserRecord>, user: Option<UserRecord>) {
        self.transition(MutationState::Success);
        // Without a signed-in user before the edit there is nothing to reconcile.
        if previous.is_none() {
            return;
        }
        self.slot.set(user);
        tracing::info!("user update confirmed by server");
        self.notifier.notify(Notification::success(UPDATED_MESSAGE));
    }

    fn fail(&self, previous: Option<UserRecord>, err: &ApiClientError) {
        self.transition(MutationState::Error);
        tracing::warn!(error = %err, "user update failed");
        // Restores only when a snapshot was captured.
        if let Some(previous) = previous {
            self.slot.set(Some(previous));
            self.notifier.notify(Notification::warning(UPDATE_FAILED_MESSAGE));
        }
    }

    fn settle(&self) {
        self.transition(MutationState::Settled);
        self.slot.invalidate();
    }

    fn transition(&self, next: MutationState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(from = ?*state, to = ?next, "mutation state change");
        *state = next;
    }
}
