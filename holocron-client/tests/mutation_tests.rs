//! Optimistic user patch flow against an in-memory user service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use holocron_cache::{CacheError, QuerySlot};
use holocron_client::mutation::{UPDATED_MESSAGE, UPDATE_FAILED_MESSAGE};
use holocron_client::{
    patch_user_on_server, user_slot, ApiClientError, MutationError, MutationState,
    PatchUserMutation, UserApi,
};
use holocron_core::{Patch, QueryKey, UserRecord};
use holocron_test_utils::fixtures::user_fixture;
use holocron_test_utils::generators::arb_user_record;
use holocron_test_utils::{MockUserApi, NotificationLevel, RecordingNotifier, ScriptedReply};
use proptest::prelude::*;
use serde_json::json;
use tokio::sync::Notify;

fn seeded_slot(user: Option<UserRecord>) -> QuerySlot<UserRecord> {
    let slot = QuerySlot::new(QueryKey::USER);
    slot.set(user);
    slot
}

fn mutation(
    slot: &QuerySlot<UserRecord>,
    api: &Arc<MockUserApi>,
    notifier: &Arc<RecordingNotifier>,
) -> PatchUserMutation<MockUserApi, RecordingNotifier> {
    PatchUserMutation::new(slot.clone(), Arc::clone(api), Arc::clone(notifier))
}

#[tokio::test]
async fn success_sends_replace_patch_and_stores_server_record() {
    let original = UserRecord::from_value(json!({"id": 1, "name": "A", "token": "t"})).unwrap();
    let edited = original.clone().with("name", json!("B"));
    let server = edited.clone().with("updated_at", json!("2024-05-01T10:00:00Z"));

    let api = Arc::new(MockUserApi::with_replies([ScriptedReply::Respond(
        server.clone(),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = seeded_slot(Some(original.clone()));
    let writes_before = slot.stats().writes;

    let result = mutation(&slot, &api, &notifier)
        .mutate(Some(edited))
        .await
        .unwrap();

    assert_eq!(result, Some(server.clone()));
    assert_eq!(slot.get(), Some(server));

    let calls = api.patch_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].original, original);
    assert_eq!(
        serde_json::to_value(&calls[0].patch).unwrap(),
        json!([{"op": "replace", "path": "/name", "value": "B"}])
    );

    assert_eq!(
        notifier.messages(),
        vec![(NotificationLevel::Success, UPDATED_MESSAGE.to_string())]
    );
    // optimistic write + server write
    assert_eq!(slot.stats().writes - writes_before, 2);
    assert_eq!(slot.stats().invalidations, 1);
}

#[tokio::test]
async fn failure_restores_snapshot_and_warns() {
    let original = user_fixture();
    let edited = original.clone().with("address", json!("Tantive IV"));

    let api = Arc::new(MockUserApi::rejecting(500, "database unavailable"));
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = seeded_slot(Some(original.clone()));
    let mutation = mutation(&slot, &api, &notifier);

    let result = mutation.mutate(Some(edited)).await;

    match result {
        Err(MutationError::Rejected(ApiClientError::Status { status, body })) => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected rejected mutation, got {:?}", other),
    }
    assert_eq!(slot.get(), Some(original));
    assert_eq!(
        notifier.messages(),
        vec![(NotificationLevel::Warning, UPDATE_FAILED_MESSAGE.to_string())]
    );
    assert_eq!(mutation.state(), MutationState::Settled);
    assert_eq!(slot.stats().invalidations, 1);
}

#[tokio::test]
async fn signed_out_mutation_makes_no_request() {
    let api = Arc::new(MockUserApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = seeded_slot(None);
    let edited = user_fixture();

    let result = mutation(&slot, &api, &notifier)
        .mutate(Some(edited.clone()))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(api.patch_calls().is_empty());
    assert_eq!(notifier.count(), 0);
    // Nothing to reconcile against, so the optimistic value stays.
    assert_eq!(slot.get(), Some(edited));
    assert_eq!(slot.stats().invalidations, 1);
}

#[tokio::test]
async fn patch_helper_short_circuits_on_missing_snapshot() {
    let api = MockUserApi::new();
    let user = user_fixture();

    assert_eq!(
        patch_user_on_server(&api, None, Some(&user)).await.unwrap(),
        None
    );
    assert_eq!(
        patch_user_on_server(&api, Some(&user), None).await.unwrap(),
        None
    );
    assert!(api.patch_calls().is_empty());
}

#[tokio::test]
async fn each_attempt_invalidates_once() {
    let api = Arc::new(MockUserApi::with_replies([
        ScriptedReply::Accept,
        ScriptedReply::Reject {
            status: 409,
            body: "conflict".to_string(),
        },
        ScriptedReply::Accept,
    ]));
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = seeded_slot(Some(user_fixture()));
    let mutation = mutation(&slot, &api, &notifier);

    for (attempt, name) in ["Leia", "General Organa", "Senator Organa"]
        .into_iter()
        .enumerate()
    {
        let current = slot.get().unwrap();
        let _ = mutation.mutate(Some(current.with("name", json!(name)))).await;
        assert_eq!(slot.stats().invalidations, attempt as u64 + 1);
    }

    assert_eq!(api.patch_calls().len(), 3);
    assert_eq!(
        slot.get().and_then(|u| u.get("name").cloned()),
        Some(json!("Senator Organa"))
    );
}

#[tokio::test]
async fn settle_refetches_user_in_background() {
    let api = Arc::new(MockUserApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = user_slot(Arc::clone(&api));
    slot.set(Some(user_fixture()));
    let mut rx = slot.subscribe();

    let edited = user_fixture().with("name", json!("Leia"));
    let mutation = PatchUserMutation::new(slot.clone(), Arc::clone(&api), notifier);
    mutation.mutate(Some(edited.clone())).await.unwrap();
    let _ = rx.borrow_and_update();

    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("background refetch did not land")
        .unwrap();

    assert_eq!(api.user_fetches(), 1);
    assert_eq!(slot.get(), Some(edited));
    assert!(!slot.is_stale());
}

/// User service that holds every patch until released.
struct GatedApi {
    gate: Arc<Notify>,
}

#[async_trait]
impl UserApi for GatedApi {
    async fn patch_user(
        &self,
        _original: &UserRecord,
        _patch: &Patch,
    ) -> Result<UserRecord, ApiClientError> {
        self.gate.notified().await;
        Err(ApiClientError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }

    async fn get_user(&self, user: &UserRecord) -> Result<UserRecord, ApiClientError> {
        Ok(user.clone())
    }
}

#[tokio::test]
async fn optimistic_value_is_visible_while_pending() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(GatedApi { gate: gate.clone() });
    let notifier = Arc::new(RecordingNotifier::new());
    let original = user_fixture();
    let slot = seeded_slot(Some(original.clone()));
    let mut rx = slot.subscribe();
    let _ = rx.borrow_and_update();

    let mutation = PatchUserMutation::new(slot.clone(), api, Arc::clone(&notifier));
    let edited = original.clone().with("email", json!("leia@rebellion.org"));
    let handle = mutation.spawn(Some(edited.clone()));

    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("optimistic write not observed")
        .unwrap();
    assert_eq!(slot.get(), Some(edited));
    assert_eq!(mutation.state(), MutationState::Pending);

    gate.notify_one();
    let result = handle.await.unwrap();
    assert!(result.is_err());
    assert_eq!(slot.get(), Some(original));
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn settle_refetch_failure_keeps_server_record_stale() {
    let api = Arc::new(MockUserApi::new());
    api.set_fetch_failure(true);
    let notifier = Arc::new(RecordingNotifier::new());
    let slot = user_slot(Arc::clone(&api));
    slot.set(Some(user_fixture()));

    let edited = user_fixture().with("name", json!("General Organa"));
    let mutation = PatchUserMutation::new(slot.clone(), Arc::clone(&api), notifier);
    let server = mutation.mutate(Some(edited.clone())).await.unwrap();
    assert_eq!(server, Some(edited.clone()));

    tokio::time::timeout(Duration::from_secs(1), async {
        while slot.stats().failed_refetches == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("settle refetch did not run");

    assert_eq!(api.user_fetches(), 1);
    assert_eq!(slot.get(), Some(edited));
    assert!(slot.is_stale());
}

/// User service whose first `get_user` call blocks until released and then
/// answers with an outdated copy.
struct SlowFetchApi {
    started: Notify,
    release: Notify,
    outdated: UserRecord,
    fetches: AtomicUsize,
}

#[async_trait]
impl UserApi for SlowFetchApi {
    async fn patch_user(
        &self,
        original: &UserRecord,
        patch: &Patch,
    ) -> Result<UserRecord, ApiClientError> {
        let mut doc = original.to_value();
        holocron_core::apply_patch(&mut doc, patch).map_err(|e| ApiClientError::Status {
            status: 422,
            body: e.to_string(),
        })?;
        Ok(UserRecord::from_value(doc)?)
    }

    async fn get_user(&self, user: &UserRecord) -> Result<UserRecord, ApiClientError> {
        if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
            self.started.notify_one();
            self.release.notified().await;
            return Ok(self.outdated.clone());
        }
        Ok(user.clone())
    }
}

#[tokio::test]
async fn mutation_discards_refetch_already_in_flight() {
    let original = user_fixture();
    let api = Arc::new(SlowFetchApi {
        started: Notify::new(),
        release: Notify::new(),
        outdated: original.clone().with("name", json!("Outdated")),
        fetches: AtomicUsize::new(0),
    });
    let slot = user_slot(Arc::clone(&api));
    slot.set(Some(original.clone()));

    let refetch = tokio::spawn({
        let slot = slot.clone();
        async move { slot.refetch().await }
    });
    api.started.notified().await;

    let edited = original.clone().with("name", json!("Leia"));
    let notifier = Arc::new(RecordingNotifier::new());
    let mutation = PatchUserMutation::new(slot.clone(), Arc::clone(&api), notifier);
    let server = mutation.mutate(Some(edited.clone())).await.unwrap();
    assert_eq!(server, Some(edited.clone()));

    api.release.notify_one();
    let late = refetch.await.unwrap();
    assert!(matches!(late, Err(CacheError::Cancelled { .. })));

    assert_eq!(slot.stats().discarded_refetches, 1);
    assert_eq!(slot.get(), Some(edited));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Failure after the optimistic write leaves the slot exactly as it was.
    #[test]
    fn failure_always_restores_original(original in arb_user_record(), edited in arb_user_record()) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let api = Arc::new(MockUserApi::rejecting(500, "nope"));
        let notifier = Arc::new(RecordingNotifier::new());
        let slot = seeded_slot(Some(original.clone()));

        let result = runtime.block_on(mutation(&slot, &api, &notifier).mutate(Some(edited)));

        prop_assert!(result.is_err());
        prop_assert_eq!(slot.get(), Some(original));
        prop_assert_eq!(slot.stats().invalidations, 1);
    }

    // Success always ends on the server's copy.
    #[test]
    fn success_always_lands_server_record(
        original in arb_user_record(),
        edited in arb_user_record(),
        server in arb_user_record(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let api = Arc::new(MockUserApi::with_replies([ScriptedReply::Respond(server.clone())]));
        let notifier = Arc::new(RecordingNotifier::new());
        let slot = seeded_slot(Some(original));

        let result = runtime.block_on(mutation(&slot, &api, &notifier).mutate(Some(edited)));

        prop_assert_eq!(result.unwrap(), Some(server.clone()));
        prop_assert_eq!(slot.get(), Some(server));
    }
}
