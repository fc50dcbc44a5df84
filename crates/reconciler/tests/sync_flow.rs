//! End-to-end reconciliation flow: create, merge-update, delete.

use std::sync::Arc;

use tether_model::{
    Datasource, DatasourceSpec, DatasourceStatus, Health, NamespacedName,
};
use tether_reconciler::{
    InMemoryLocalStore, InMemoryRemoteSource, LocalStore, OwnershipMerge, ReconcileOutcome,
    Reconciler, ReconcilerConfig, StoreOp,
};

fn setup() -> (
    Reconciler<Datasource>,
    Arc<InMemoryRemoteSource<Datasource>>,
    Arc<InMemoryLocalStore<Datasource>>,
) {
    let source = Arc::new(InMemoryRemoteSource::new());
    let store = Arc::new(InMemoryLocalStore::new());
    let reconciler = Reconciler::new(
        source.clone(),
        store.clone(),
        Arc::new(OwnershipMerge),
        ReconcilerConfig::default(),
    );
    (reconciler, source, store)
}

#[tokio::test]
async fn full_lifecycle_follows_remote_mutations() {
    let (reconciler, source, store) = setup();
    let key = NamespacedName::new("ns1", "ds-a");

    // Remote gains the entity; local is empty. Expect exactly one create
    // with the remote payload.
    let original = Datasource::new(
        key.clone(),
        DatasourceSpec::new("prometheus", "http://x")
            .with_json_data(serde_json::json!({"timeInterval": "30s"})),
    );
    source.put(key.clone(), original.clone()).await;

    assert_eq!(reconciler.reconcile(&key).await, ReconcileOutcome::Done);
    assert_eq!(store.get(&key).await.ok(), Some(original));
    assert_eq!(
        store.journal().await,
        vec![StoreOp::Create { key: key.clone() }]
    );

    // The runtime records operational state on its copy; the remote side
    // then changes the URL. Expect exactly one update carrying the new spec
    // and the preserved status.
    let local = store.get(&key).await.ok().map(|d| {
        d.with_status(DatasourceStatus::down("connection refused"))
    });
    if let Some(local) = local {
        store.seed(key.clone(), local).await;
    }
    source
        .put(
            key.clone(),
            Datasource::new(key.clone(), DatasourceSpec::new("prometheus", "http://y")),
        )
        .await;

    assert_eq!(reconciler.reconcile(&key).await, ReconcileOutcome::Done);
    let stored = store.get(&key).await.ok();
    assert_eq!(
        stored.as_ref().map(|d| d.spec.url.as_str()),
        Some("http://y")
    );
    assert_eq!(
        stored.as_ref().map(|d| d.status.health),
        Some(Health::Down)
    );
    assert_eq!(
        store.journal().await,
        vec![
            StoreOp::Create { key: key.clone() },
            StoreOp::Update { key: key.clone() },
        ]
    );

    // Remote deletes the entity. Expect exactly one delete.
    source.remove(&key).await;

    assert_eq!(reconciler.reconcile(&key).await, ReconcileOutcome::Done);
    assert!(store.is_empty().await);
    assert_eq!(
        store.journal().await,
        vec![
            StoreOp::Create { key: key.clone() },
            StoreOp::Update { key: key.clone() },
            StoreOp::Delete { key: key.clone() },
        ]
    );

    // Reconciling the now fully-absent key is still success.
    assert_eq!(reconciler.reconcile(&key).await, ReconcileOutcome::Done);
}

#[tokio::test]
async fn existence_equivalence_over_many_keys() {
    let (reconciler, source, store) = setup();

    let keys: Vec<NamespacedName> = (0..5)
        .map(|i| NamespacedName::new("ns1", format!("ds-{i}")))
        .collect();

    // Remote holds the even-numbered keys; local starts with the odd ones.
    for (i, key) in keys.iter().enumerate() {
        let entity = Datasource::new(
            key.clone(),
            DatasourceSpec::new("prometheus", format!("http://ds-{i}")),
        );
        if i % 2 == 0 {
            source.put(key.clone(), entity).await;
        } else {
            store.seed(key.clone(), entity).await;
        }
    }

    for key in &keys {
        assert_eq!(reconciler.reconcile(key).await, ReconcileOutcome::Done);
    }

    // After one pass per key, local existence matches remote existence.
    let expected: Vec<NamespacedName> = keys
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0)
        .map(|(_, k)| k.clone())
        .collect();
    assert_eq!(store.keys().await, expected);
}
