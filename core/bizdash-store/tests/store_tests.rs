mod common;

use bizdash_gateway::{GatewayError, InMemoryGateway, RemoteGateway};
use bizdash_model::{MemoryCategory, MemoryFact, MemoryFactDraft, MemoryFactPatch};
use bizdash_store::{
    FetchOrdering, Operation, Store, StoreConfig, StoreError, StoreEvent, StoreStatus,
    UpdatePolicy,
};
use common::{FixedGate, ScriptedGateway, fact, id, ids};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn store_over(gateway: Arc<InMemoryGateway<MemoryFact>>) -> Store<MemoryFact> {
    Store::new(gateway, StoreConfig::default())
}

fn seeded(rows: Vec<MemoryFact>) -> (Arc<InMemoryGateway<MemoryFact>>, Store<MemoryFact>) {
    let gateway = Arc::new(InMemoryGateway::with_rows(rows));
    let store = store_over(gateway.clone());
    (gateway, store)
}

fn network_error() -> GatewayError {
    GatewayError::Network("connection reset".into())
}

// ── Initial state ────────────────────────────────────────────────

#[test]
fn new_store_is_uninitialized() {
    let (_, store) = seeded(vec![]);
    let snapshot = store.snapshot();

    assert!(snapshot.is_empty());
    assert!(!snapshot.loading());
    assert!(!snapshot.initialized());
    assert_eq!(snapshot.status(), StoreStatus::Uninitialized);
    assert_eq!(store.family(), "memory_facts");
}

// ── fetch_all ────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_replaces_collection_exactly() {
    let (gateway, store) = seeded(vec![
        fact("b", MemoryCategory::Goal, "two"),
        fact("a", MemoryCategory::Goal, "one"),
    ]);
    store.fetch_all().await.unwrap();
    assert_eq!(ids(store.snapshot().collection()), vec!["b", "a"]);

    // Server drops "a" and gains "c": the next fetch is a full replace.
    gateway.set_rows(vec![
        fact("c", MemoryCategory::Goal, "three"),
        fact("b", MemoryCategory::Goal, "two"),
    ]);
    store.fetch_all().await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.collection(), gateway.rows().as_slice());
    assert!(snapshot.initialized());
    assert!(!snapshot.loading());
    assert_eq!(snapshot.status(), StoreStatus::Ready);
}

#[tokio::test]
async fn empty_fetch_still_initializes() {
    let (_, store) = seeded(vec![]);
    store.fetch_all().await.unwrap();
    assert!(store.is_initialized());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn failed_fetch_keeps_last_known_good() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();
    let before = store.collection();

    gateway.fail_next(network_error());
    let err = store.fetch_all().await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Remote {
            operation: Operation::Fetch,
            source: GatewayError::Network(_),
            ..
        }
    ));
    assert_eq!(&*store.collection(), &*before);
    assert!(!store.is_loading());
    assert!(store.is_initialized());
}

#[tokio::test]
async fn failed_first_fetch_stays_uninitialized() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    gateway.fail_next(network_error());

    assert!(store.fetch_all().await.is_err());
    assert_eq!(store.status(), StoreStatus::Uninitialized);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn loading_brackets_the_remote_call() {
    let gateway = Arc::new(ScriptedGateway::<MemoryFact>::new());
    let store = Arc::new(Store::new(gateway.clone(), StoreConfig::default()));

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(1).await;
    assert!(store.is_loading());
    assert_eq!(store.status(), StoreStatus::Loading);

    gateway.resolve(0, Ok(vec![fact("a", MemoryCategory::Goal, "one")]));
    task.await.unwrap().unwrap();
    assert!(!store.is_loading());
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn overlapping_fetches_last_completed_wins() {
    let gateway = Arc::new(ScriptedGateway::<MemoryFact>::new());
    let store = Arc::new(Store::new(gateway.clone(), StoreConfig::default()));

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(1).await;
    let second = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(2).await;

    gateway.resolve(1, Ok(vec![fact("y", MemoryCategory::Goal, "Y")]));
    second.await.unwrap().unwrap();
    assert!(store.is_loading(), "first call still in flight");

    gateway.resolve(0, Ok(vec![fact("x", MemoryCategory::Goal, "X")]));
    first.await.unwrap().unwrap();

    assert_eq!(ids(store.snapshot().collection()), vec!["x"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn latest_issued_ordering_discards_stale_response() {
    let gateway = Arc::new(ScriptedGateway::<MemoryFact>::new());
    let config = StoreConfig {
        fetch_ordering: FetchOrdering::LatestIssued,
        ..Default::default()
    };
    let store = Arc::new(Store::new(gateway.clone(), config));

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(1).await;
    let second = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(2).await;

    gateway.resolve(1, Ok(vec![fact("y", MemoryCategory::Goal, "Y")]));
    second.await.unwrap().unwrap();
    gateway.resolve(0, Ok(vec![fact("x", MemoryCategory::Goal, "X")]));
    first.await.unwrap().unwrap();

    assert_eq!(ids(store.snapshot().collection()), vec!["y"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn cancelled_fetch_clears_loading() {
    let gateway = Arc::new(ScriptedGateway::<MemoryFact>::new());
    let store = Store::new(gateway.clone(), StoreConfig::default());

    let result = tokio::time::timeout(Duration::from_millis(20), store.fetch_all()).await;
    assert!(result.is_err(), "scripted list never resolves");
    assert!(!store.is_loading());
    assert!(!store.is_initialized());
}

// ── add ──────────────────────────────────────────────────────────

#[tokio::test]
async fn add_refetches_instead_of_splicing() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store
        .add(MemoryFactDraft::new("Focus on churn", Some(MemoryCategory::Strategy)))
        .await
        .unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.create, 1);
    assert_eq!(calls.list, 1);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.collection(), gateway.rows().as_slice());
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.collection()[0].content, "Focus on churn");
    assert!(snapshot.initialized());
    assert!(!snapshot.loading());
}

#[tokio::test]
async fn failed_add_leaves_collection_untouched() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();
    let before = store.collection().to_vec();

    gateway.fail_next(network_error());
    let err = store
        .add(MemoryFactDraft::new("phantom", None))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Remote { operation: Operation::Add, .. }));
    assert_eq!(store.collection().to_vec(), before);
    assert_eq!(gateway.calls().list, 1, "no refetch after a failed create");
    assert!(!store.is_loading());
}

#[tokio::test]
async fn add_fact_defaults_category() {
    let (_, store) = seeded(vec![]);
    store.add_fact("Keep burn low", None).await.unwrap();
    assert_eq!(store.snapshot().collection()[0].category, MemoryCategory::General);
}

// ── update ───────────────────────────────────────────────────────

#[tokio::test]
async fn update_splices_returned_record() {
    let (gateway, store) = seeded(vec![
        fact("b", MemoryCategory::Goal, "two"),
        fact("a", MemoryCategory::Goal, "one"),
    ]);
    store.fetch_all().await.unwrap();

    let patch = MemoryFactPatch {
        content: Some("uno".into()),
        ..Default::default()
    };
    store.update(&id("a"), patch).await.unwrap();

    assert_eq!(gateway.calls().list, 1);
    assert_eq!(store.snapshot().collection(), gateway.rows().as_slice());
    assert_eq!(store.get(&id("a")).unwrap().content, "uno");
}

#[tokio::test]
async fn update_with_refetch_policy() {
    let rows = vec![fact("a", MemoryCategory::Goal, "one")];
    let gateway = Arc::new(InMemoryGateway::with_rows(rows));
    let config = StoreConfig {
        update_policy: UpdatePolicy::Refetch,
        ..Default::default()
    };
    let store = Store::new(gateway.clone(), config);
    store.fetch_all().await.unwrap();

    store
        .update(
            &id("a"),
            MemoryFactPatch {
                category: Some(MemoryCategory::Strategy),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(gateway.calls().list, 2);
    assert_eq!(store.get(&id("a")).unwrap().category, MemoryCategory::Strategy);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn update_of_id_missing_locally_is_not_a_store_error() {
    let (gateway, store) = seeded(vec![]);
    store.fetch_all().await.unwrap();
    // Another session created a row this store has not fetched yet.
    gateway.set_rows(vec![fact("z", MemoryCategory::Goal, "late")]);

    store
        .update(
            &id("z"),
            MemoryFactPatch {
                content: Some("edited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn failed_update_leaves_collection_untouched() {
    let (_, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();
    let before = store.collection().to_vec();

    let err = store
        .update(
            &id("ghost"),
            MemoryFactPatch {
                content: Some("x".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(err.gateway_error().is_some_and(GatewayError::is_not_found));
    assert_eq!(store.collection().to_vec(), before);
    assert!(!store.is_loading());
}

// ── remove ───────────────────────────────────────────────────────

#[tokio::test]
async fn remove_evicts_locally_without_refetch() {
    let (gateway, store) = seeded(vec![
        fact("b", MemoryCategory::Goal, "two"),
        fact("a", MemoryCategory::Goal, "one"),
    ]);
    store.fetch_all().await.unwrap();

    store.remove(&id("a")).await.unwrap();

    assert_eq!(ids(store.snapshot().collection()), vec!["b"]);
    assert_eq!(gateway.calls().list, 1);
    assert!(store.get(&id("a")).is_none());
}

#[tokio::test]
async fn remove_of_id_not_held_locally_keeps_size() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();
    gateway
        .create(MemoryFactDraft::new("elsewhere", None))
        .await
        .unwrap();
    let remote_only = gateway.rows()[0].id.clone();

    store.remove(&remote_only).await.unwrap();
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn remove_evicts_every_copy_of_a_duplicated_id() {
    let (_, store) = seeded(vec![
        fact("a", MemoryCategory::Goal, "one"),
        fact("a", MemoryCategory::Goal, "one again"),
        fact("b", MemoryCategory::Goal, "two"),
    ]);
    store.fetch_all().await.unwrap();

    store.remove(&id("a")).await.unwrap();
    assert_eq!(ids(store.snapshot().collection()), vec!["b"]);
}

#[tokio::test]
async fn failed_remove_leaves_collection_untouched() {
    let (gateway, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();

    gateway.fail_next(network_error());
    let err = store.remove(&id("a")).await.unwrap_err();

    assert!(matches!(err, StoreError::Remote { operation: Operation::Remove, .. }));
    assert_eq!(store.snapshot().len(), 1);
    assert!(!store.is_loading());
}

// ── reset ────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_returns_to_uninitialized() {
    let (_, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    store.fetch_all().await.unwrap();

    store.reset();

    let snapshot = store.snapshot();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.status(), StoreStatus::Uninitialized);
}

#[tokio::test]
async fn response_arriving_after_reset_is_ignored() {
    let gateway = Arc::new(ScriptedGateway::<MemoryFact>::new());
    let store = Arc::new(Store::new(gateway.clone(), StoreConfig::default()));

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_all().await }
    });
    gateway.wait_for_list_calls(1).await;

    store.reset();
    assert!(!store.is_loading());

    gateway.resolve(0, Ok(vec![fact("stale", MemoryCategory::Goal, "old user")]));
    task.await.unwrap().unwrap();

    assert!(store.snapshot().is_empty());
    assert_eq!(store.status(), StoreStatus::Uninitialized);
}

#[tokio::test]
async fn add_interrupted_by_reset_does_not_refill_store() {
    let gateway =
        Arc::new(InMemoryGateway::<MemoryFact>::new().with_latency(Duration::from_millis(50)));
    let store = Arc::new(store_over(gateway.clone()));

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.add(MemoryFactDraft::new("Focus on churn", None)).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.reset();

    task.await.unwrap().unwrap();
    assert_eq!(store.status(), StoreStatus::Uninitialized);
    assert!(store.snapshot().is_empty());
    assert_eq!(gateway.calls().list, 0);
    assert_eq!(gateway.rows().len(), 1, "the create itself still happened");
}

#[tokio::test]
async fn refetching_update_interrupted_by_reset_does_not_refill_store() {
    let gateway = Arc::new(
        InMemoryGateway::with_rows(vec![fact("a", MemoryCategory::Goal, "one")])
            .with_latency(Duration::from_millis(50)),
    );
    let config = StoreConfig {
        update_policy: UpdatePolicy::Refetch,
        ..Default::default()
    };
    let store = Arc::new(Store::new(gateway.clone(), config));
    store.fetch_all().await.unwrap();

    let task = tokio::spawn({
        let store = store.clone();
        async move {
            let patch = MemoryFactPatch {
                content: Some("uno".into()),
                ..Default::default()
            };
            store.update(&id("a"), patch).await
        }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.reset();

    task.await.unwrap().unwrap();
    assert_eq!(store.status(), StoreStatus::Uninitialized);
    assert!(store.snapshot().is_empty());
    assert_eq!(gateway.calls().list, 1);
}

// ── Events ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_emits_changed_events_with_rising_versions() {
    let (_, store) = seeded(vec![fact("a", MemoryCategory::Goal, "one")]);
    let mut events = store.subscribe();

    store.fetch_all().await.unwrap();

    let mut versions = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            StoreEvent::Changed { family, version } => {
                assert_eq!(family, "memory_facts");
                versions.push(version);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(versions.len(), 2, "loading raised, then settled with data");
    assert!(versions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(store.snapshot().version(), *versions.last().unwrap());
}

#[tokio::test]
async fn failure_is_reported_once_on_event_channel() {
    let (gateway, store) = seeded(vec![]);
    let mut events = store.subscribe();
    gateway.fail_next(network_error());

    let _ = store.fetch_all().await;

    let failures: Vec<StoreEvent> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| matches!(e, StoreEvent::Failed { .. }))
        .collect();
    assert_eq!(failures.len(), 1);
    match &failures[0] {
        StoreEvent::Failed { operation, message, .. } => {
            assert_eq!(*operation, Operation::Fetch);
            assert!(message.contains("connection reset"));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn reset_emits_reset_event() {
    let (_, store) = seeded(vec![]);
    let mut events = store.subscribe();
    store.reset();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::Reset {
            family: "memory_facts"
        }
    );
}

// ── Identity requirement ─────────────────────────────────────────

#[tokio::test]
async fn pending_identity_blocks_network() {
    let gateway = Arc::new(InMemoryGateway::<MemoryFact>::new());
    let gate = Arc::new(FixedGate::new(false, true));
    let store = Store::new(gateway.clone(), StoreConfig::default()).requires_identity(gate.clone());

    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, StoreError::AuthPending { .. }));
    assert_eq!(gateway.calls().list, 0);
    assert!(!store.is_loading());

    gate.set(false, false);
    let err = store.add(MemoryFactDraft::new("x", None)).await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthenticated { .. }));
    assert_eq!(gateway.calls().create, 0);

    gate.set(true, false);
    store.fetch_all().await.unwrap();
    assert!(store.is_initialized());
}

// ── Projection ───────────────────────────────────────────────────

#[tokio::test]
async fn memory_prompt_reads_current_collection() {
    let (_, store) = seeded(vec![fact("a", MemoryCategory::Strategy, "Focus on churn")]);
    assert_eq!(store.memory_prompt(), "No strategic memory recorded yet.");

    store.fetch_all().await.unwrap();
    assert!(store.memory_prompt().contains("[STRATEGY] Focus on churn"));
}
