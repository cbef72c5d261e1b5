use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join;

use clusterd_controlapi::schema::{
    GetClusterRequest, ListClustersFilters, ListClustersRequest, UpdateClusterRequest,
};
use clusterd_controlapi::{ControlApi, ControlApiError, SpecValidator, Status, StatusCode};
use clusterd_metadata::cluster::{
    Cluster, ClusterSpec, EncryptionKey, NodeRole, RoleAdmissionPolicy, RootCa,
};
use clusterd_metadata::core::Version;
use clusterd_metadata::store::{MemoryStore, ReadTx, Store, StoreError, WriteTx};
use clusterd_types::defaults::REDACTED_MARKER;

type TestApi = ControlApi<Arc<MemoryStore<Cluster>>>;

fn sensitive_spec(name: &str) -> ClusterSpec {
    ClusterSpec::named(name)
        .with_label("env", "prod")
        .with_policy(RoleAdmissionPolicy::new(NodeRole::Manager).with_secret("s3cr3t"))
        .with_policy(RoleAdmissionPolicy::new(NodeRole::Worker))
}

fn sensitive_cluster(id: &str, name: &str) -> Cluster {
    Cluster::new(sensitive_spec(name))
        .with_id(id)
        .with_root_ca(RootCa {
            ca_cert: "X".to_owned(),
            ca_cert_hash: "Y".to_owned(),
            ca_key: "Z".to_owned(),
        })
        .with_bootstrap_key(EncryptionKey {
            subsystem: "networking:gossip".to_owned(),
            algorithm: "aes-128-gcm".to_owned(),
            key: "bootstrap-private".to_owned(),
            lamport_time: 1,
        })
}

async fn seed(store: &Arc<MemoryStore<Cluster>>, clusters: Vec<Cluster>) {
    store
        .update(|tx| -> Result<(), StoreError> {
            for cluster in clusters {
                tx.create(cluster)?;
            }
            Ok(())
        })
        .await
        .expect("seed");
}

/// rewrite the stored cluster until it carries `target`
async fn bump_version(store: &Arc<MemoryStore<Cluster>>, id: &str, target: u64) {
    while store.current_version().await.index < target {
        store
            .update(|tx| -> Result<(), StoreError> {
                let cluster = tx.get(id).ok_or_else(|| StoreError::NotExist(id.to_owned()))?;
                tx.update(cluster)
            })
            .await
            .expect("bump");
    }
}

async fn stored(store: &Arc<MemoryStore<Cluster>>, id: &str) -> Cluster {
    store.view(|tx| tx.get(id)).await.expect("stored cluster")
}

async fn api_with(clusters: Vec<Cluster>) -> TestApi {
    let store = MemoryStore::new_shared();
    seed(&store, clusters).await;
    ControlApi::new(store, SpecValidator::default())
}

fn assert_redacted(cluster: &Cluster) {
    if let Some(root_ca) = &cluster.root_ca {
        assert!(!root_ca.has_key(), "root key leaked for {}", cluster.id);
    }
    assert!(cluster.network_bootstrap_keys.is_empty());
    for policy in &cluster.spec.acceptance_policy.policies {
        assert!(policy.secret.is_empty() || policy.secret == REDACTED_MARKER);
    }
    let yaml = serde_yaml::to_string(cluster).expect("yaml");
    assert!(!yaml.contains("s3cr3t"));
    assert!(!yaml.contains("caKey"));
    assert!(!yaml.contains("bootstrap-private"));
}

fn ids(clusters: &[Cluster]) -> Vec<&str> {
    clusters.iter().map(|cluster| cluster.id.as_str()).collect()
}

#[fluvio_future::test]
async fn test_get_is_redacted() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;

    let response = api
        .get_cluster(GetClusterRequest::new("c1"))
        .await
        .expect("get");
    let cluster = response.cluster();
    assert_redacted(cluster);
    assert_eq!(
        cluster.root_ca,
        Some(RootCa {
            ca_cert: "X".to_owned(),
            ca_cert_hash: "Y".to_owned(),
            ca_key: String::new(),
        })
    );
    assert_eq!(
        cluster.spec.acceptance_policy.policies[0].secret,
        REDACTED_MARKER
    );
    assert_eq!(cluster.spec.acceptance_policy.policies[1].secret, "");
}

#[fluvio_future::test]
async fn test_update_is_redacted() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let version = stored(api.store(), "c1").await.meta.version;

    let spec = sensitive_spec("default").with_node_cert_expiry(Duration::from_secs(7200));
    let response = api
        .update_cluster(UpdateClusterRequest::new("c1", version, spec))
        .await
        .expect("update");
    assert_redacted(response.cluster());
    assert!(response.cluster().meta.version > version);

    // private material survives in the store
    let cluster = stored(api.store(), "c1").await;
    assert!(cluster.root_ca.expect("root ca").has_key());
    assert_eq!(cluster.network_bootstrap_keys.len(), 1);
    assert_eq!(cluster.spec.acceptance_policy.policies[0].secret, "s3cr3t");
}

#[fluvio_future::test]
async fn test_update_applies_spec_and_keeps_created_at() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let before = stored(api.store(), "c1").await;

    let spec = ClusterSpec::named("default").with_label("tier", "gold");
    let response = api
        .update_cluster(UpdateClusterRequest::new("c1", before.meta.version, spec.clone()))
        .await
        .expect("update");

    let after = stored(api.store(), "c1").await;
    assert_eq!(after.spec, spec);
    assert_eq!(after.meta.created_at, before.meta.created_at);
    assert_eq!(response.cluster().meta, after.meta);
}

#[fluvio_future::test]
async fn test_list_is_redacted() {
    let api = api_with(vec![
        sensitive_cluster("c1", "default"),
        sensitive_cluster("c2", "other"),
    ])
    .await;

    let response = api
        .list_clusters(ListClustersRequest::default())
        .await
        .expect("list");
    assert_eq!(response.clusters().len(), 2);
    response.clusters().iter().for_each(assert_redacted);
}

#[fluvio_future::test]
async fn test_update_below_minimum_expiry_does_not_mutate() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let before = stored(api.store(), "c1").await;
    let committed = api.store().current_version().await;

    let spec = sensitive_spec("renamed").with_node_cert_expiry(Duration::from_secs(60));
    let err = api
        .update_cluster(UpdateClusterRequest::new("c1", before.meta.version, spec))
        .await
        .expect_err("too short");
    assert_eq!(err.code(), StatusCode::InvalidArgument);
    assert_eq!(err.to_string(), "minimum certificate expiry time is: 1h");

    let response = api
        .get_cluster(GetClusterRequest::new("c1"))
        .await
        .expect("get");
    assert_eq!(response.cluster().spec.annotations.name, "default");
    assert_eq!(response.cluster().meta.version, before.meta.version);
    assert_eq!(api.store().current_version().await, committed);
}

#[fluvio_future::test]
async fn test_update_missing_cluster() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let committed = api.store().current_version().await;

    let err = api
        .update_cluster(UpdateClusterRequest::new(
            "missing",
            committed,
            ClusterSpec::named("missing"),
        ))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), StatusCode::NotFound);
    assert_eq!(err.to_string(), "cluster missing not found");
    assert_eq!(api.store().current_version().await, committed);
    assert_eq!(api.store().count().await, 1);
}

#[fluvio_future::test]
async fn test_update_missing_fields() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;

    let no_id = UpdateClusterRequest::new("", Version::new(1), ClusterSpec::named("default"));
    let no_version = UpdateClusterRequest {
        cluster_id: "c1".to_owned(),
        cluster_version: None,
        spec: Some(ClusterSpec::named("default")),
    };
    let no_spec = UpdateClusterRequest {
        cluster_id: "c1".to_owned(),
        cluster_version: Some(Version::new(1)),
        spec: None,
    };

    for request in [no_id, no_version, no_spec] {
        let err = api.update_cluster(request).await.expect_err("invalid");
        assert_eq!(err.code(), StatusCode::InvalidArgument);
        assert_eq!(err.to_string(), "invalid argument");
    }
}

#[fluvio_future::test]
async fn test_stale_version_conflict() {
    let store = MemoryStore::new_shared();
    seed(&store, vec![sensitive_cluster("c1", "default")]).await;
    bump_version(&store, "c1", 7).await;
    let before = stored(&store, "c1").await;
    assert_eq!(before.meta.version, Version::new(7));

    let api = ControlApi::new(store.clone(), SpecValidator::default());
    let result = api
        .update_cluster(UpdateClusterRequest::new(
            "c1",
            Version::new(5),
            ClusterSpec::named("renamed"),
        ))
        .await;
    let err = result.as_ref().expect_err("stale");
    assert_eq!(err.code(), StatusCode::Conflict);
    assert!(matches!(
        err,
        ControlApiError::Store(StoreError::SequenceConflict)
    ));
    assert_eq!(Status::from(&result).code, StatusCode::Conflict);

    let after = stored(&store, "c1").await;
    assert_eq!(after, before);
}

#[fluvio_future::test]
async fn test_concurrent_writers_one_wins() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let version = stored(api.store(), "c1").await.meta.version;

    let (first, second) = join(
        api.update_cluster(UpdateClusterRequest::new(
            "c1",
            version,
            ClusterSpec::named("first"),
        )),
        api.update_cluster(UpdateClusterRequest::new(
            "c1",
            version,
            ClusterSpec::named("second"),
        )),
    )
    .await;

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_err() { first } else { second };
    assert!(loser.expect_err("loser").is_conflict());

    let winner_name = stored(api.store(), "c1").await.spec.annotations.name;
    assert!(winner_name == "first" || winner_name == "second");
}

#[fluvio_future::test]
async fn test_update_with_fresh_version_after_conflict() {
    let api = api_with(vec![sensitive_cluster("c1", "default")]).await;
    let version = stored(api.store(), "c1").await.meta.version;

    let updated = api
        .update_cluster(UpdateClusterRequest::new("c1", version, ClusterSpec::named("a")))
        .await
        .expect("first");

    assert!(
        api.update_cluster(UpdateClusterRequest::new("c1", version, ClusterSpec::named("b")))
            .await
            .expect_err("stale")
            .is_conflict()
    );

    let fresh = updated.cluster().meta.version;
    let response = api
        .update_cluster(UpdateClusterRequest::new("c1", fresh, ClusterSpec::named("b")))
        .await
        .expect("fresh");
    assert_eq!(response.cluster().spec.annotations.name, "b");
}

#[fluvio_future::test]
async fn test_list_names_filter() {
    let api = api_with(vec![
        sensitive_cluster("a1", "prod"),
        sensitive_cluster("a2", "dev"),
        sensitive_cluster("b1", "prod"),
        sensitive_cluster("b2", "Prod"),
        sensitive_cluster("c1", "staging"),
    ])
    .await;

    let all = api
        .list_clusters(ListClustersRequest::default())
        .await
        .expect("list");
    assert_eq!(ids(all.clusters()), vec!["a1", "a2", "b1", "b2", "c1"]);

    let by_name = api
        .list_clusters(ListClustersRequest::with_filters(
            ListClustersFilters::by_names(["prod", "staging"]),
        ))
        .await
        .expect("list");
    // name matching is exact
    assert_eq!(ids(by_name.clusters()), vec!["a1", "b1", "c1"]);
}

#[fluvio_future::test]
async fn test_list_filter_combinations() {
    let labeled = |id: &str, name: &str, key: &str, value: &str| {
        Cluster::new(ClusterSpec::named(name).with_label(key, value)).with_id(id)
    };
    let api = api_with(vec![
        labeled("a1", "prod", "env", "prod"),
        labeled("a2", "dev", "env", "dev"),
        labeled("b1", "prod", "team", "core"),
        labeled("b2", "staging", "env", "prod"),
    ])
    .await;

    let api = &api;
    let list = move |filters: ListClustersFilters| {
        api.list_clusters(ListClustersRequest::with_filters(filters))
    };

    let prefixed = list(ListClustersFilters::by_id_prefixes(["a"]))
        .await
        .expect("list");
    assert_eq!(ids(prefixed.clusters()), vec!["a1", "a2"]);

    let names_and_prefix = list(ListClustersFilters {
        names: vec!["prod".to_owned()],
        id_prefixes: vec!["b".to_owned()],
        ..Default::default()
    })
    .await
    .expect("list");
    assert_eq!(ids(names_and_prefix.clusters()), vec!["b1"]);

    let label_value = list(ListClustersFilters::default().with_label("env", "prod"))
        .await
        .expect("list");
    assert_eq!(ids(label_value.clusters()), vec!["a1", "b2"]);

    let label_present = list(ListClustersFilters::default().with_label("team", ""))
        .await
        .expect("list");
    assert_eq!(ids(label_present.clusters()), vec!["b1"]);

    // any label constraint may match
    let either_label = list(
        ListClustersFilters::default()
            .with_label("env", "dev")
            .with_label("team", ""),
    )
    .await
    .expect("list");
    assert_eq!(ids(either_label.clusters()), vec!["a2", "b1"]);

    let nothing = list(ListClustersFilters::by_names(["unknown"]))
        .await
        .expect("list");
    assert!(nothing.clusters().is_empty());
}

/// Store which counts how often it is opened
struct CountingStore {
    inner: MemoryStore<Cluster>,
    calls: AtomicUsize,
}

impl Store for CountingStore {
    type Object = Cluster;

    async fn view<F, R>(&self, read_fn: F) -> R
    where
        F: FnOnce(&dyn ReadTx<Cluster>) -> R,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.view(read_fn).await
    }

    async fn update<F, R, E>(&self, write_fn: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn WriteTx<Cluster>) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update(write_fn).await
    }
}

#[fluvio_future::test]
async fn test_rejected_requests_skip_store() {
    let api = ControlApi::new(
        CountingStore {
            inner: MemoryStore::default(),
            calls: AtomicUsize::new(0),
        },
        SpecValidator::default(),
    );

    let err = api
        .get_cluster(GetClusterRequest::new(""))
        .await
        .expect_err("empty id");
    assert_eq!(err.code(), StatusCode::InvalidArgument);

    let short = ClusterSpec::named("c").with_node_cert_expiry(Duration::from_secs(1));
    let err = api
        .update_cluster(UpdateClusterRequest::new("c1", Version::new(1), short))
        .await
        .expect_err("short expiry");
    assert_eq!(err.code(), StatusCode::InvalidArgument);

    assert_eq!(api.store().calls.load(Ordering::SeqCst), 0);

    let err = api
        .get_cluster(GetClusterRequest::new("c1"))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), StatusCode::NotFound);
    assert_eq!(api.store().calls.load(Ordering::SeqCst), 1);
}

#[fluvio_future::test]
async fn test_metadata_dir_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");

    {
        let store = Arc::new(MemoryStore::<Cluster>::load_from(dir.path()).expect("open"));
        seed(&store, vec![sensitive_cluster("c1", "default")]).await;
        let api = ControlApi::new(store, SpecValidator::default());
        let version = stored(api.store(), "c1").await.meta.version;
        api.update_cluster(UpdateClusterRequest::new(
            "c1",
            version,
            sensitive_spec("renamed"),
        ))
        .await
        .expect("update");
    }

    let store = Arc::new(MemoryStore::<Cluster>::load_from(dir.path()).expect("reload"));
    let api = ControlApi::new(store, SpecValidator::default());
    let response = api
        .list_clusters(ListClustersRequest::with_filters(
            ListClustersFilters::by_names(["renamed"]),
        ))
        .await
        .expect("list");
    assert_eq!(ids(response.clusters()), vec!["c1"]);
    assert_redacted(&response.clusters()[0]);
    assert_eq!(api.store().current_version().await, Version::new(2));
}
