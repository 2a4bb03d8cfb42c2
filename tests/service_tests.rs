//! End-to-end tree building tests
//!
//! Builds complete trees from `tests/fixtures/prod-cluster.yaml` through the
//! public request API, the same path the CLI and dashboard glue use.

use async_trait::async_trait;
use capiviz::client::{CrdInfo, ListOptions};
use capiviz::config::Config;
use capiviz::ownership::FetchPolicy;
use capiviz::resource::ObjectReference;
use capiviz::service::get_custom_resource;
use capiviz::{
    ClusterOptions, Error, ObjectClient, Resource, ResourceNode, Result, SnapshotClient,
    build_cluster_resource_tree,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fixture() -> SnapshotClient {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/prod-cluster.yaml");
    SnapshotClient::from_file(&path).unwrap()
}

/// Counts fetches and fails those of one kind
struct InstrumentedClient {
    inner: SnapshotClient,
    failing_kind: Option<&'static str>,
    fetches: AtomicUsize,
}

impl InstrumentedClient {
    fn new(failing_kind: Option<&'static str>) -> Self {
        Self {
            inner: fixture(),
            failing_kind,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ObjectClient for InstrumentedClient {
    async fn fetch_by_reference(&self, reference: &ObjectReference) -> Result<Resource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_kind == Some(reference.kind.as_str()) {
            return Err(Error::internal(format!("fetching {} timed out", reference)));
        }
        self.inner.fetch_by_reference(reference).await
    }

    async fn list_crds(&self, label_selector: &str) -> Result<Vec<CrdInfo>> {
        self.inner.list_crds(label_selector).await
    }

    async fn list_objects(
        &self,
        api_version: &str,
        kind: &str,
        options: &ListOptions,
    ) -> Result<Vec<Resource>> {
        self.inner.list_objects(api_version, kind, options).await
    }
}

fn prod() -> ClusterOptions {
    ClusterOptions::new("default", "prod")
}

fn find<'a>(node: &'a ResourceNode, kind: &str) -> Option<&'a ResourceNode> {
    if node.kind == kind {
        return Some(node);
    }
    node.children.iter().find_map(|c| find(c, kind))
}

#[tokio::test]
async fn test_prod_cluster_outline() {
    let client = fixture();
    let tree = build_cluster_resource_tree(&client, &prod(), &Config::default())
        .await
        .unwrap();

    insta::assert_snapshot!(tree.outline(), @r"
Cluster prod [cluster] ready
  AddonsGroup Add-ons [addons]
    ClusterResourceSetGroup ClusterResourceSets [addons] (collapsed)
      ClusterResourceSet crs-cni [addons]
      ClusterResourceSet crs-storage [addons]
    HelmChartProxy cni [addons] ready
      HelmReleaseProxy cni-prod-x8k2 [addons] ready
  DockerCluster prod [infrastructure] ready
    Widget widget-a [infrastructure]
  KubeadmControlPlane prod-control-plane [controlplane] ready
    Machine prod-control-plane-x1 [cluster] ready (collapsed)
  MachineDeployment prod-md-0 [cluster] ready
    MachineSet prod-md-0-6d8f [cluster] ready
      Machine 3 Machines [cluster] not-ready:Warning (collapsed)
        Machine prod-md-0-6d8f-a [cluster] ready (collapsed)
          DockerMachine prod-md-0-6d8f-a [infrastructure] ready
        Machine prod-md-0-6d8f-b [cluster] not-ready:Warning (collapsed)
        Machine prod-md-0-6d8f-c [cluster] (collapsed)
");
}

#[tokio::test]
async fn test_missing_cluster_is_not_found() {
    let client = fixture();
    let err = build_cluster_resource_tree(
        &client,
        &ClusterOptions::new("default", "staging"),
        &Config::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_other_cluster_does_not_leak() {
    let client = fixture();
    let prod = build_cluster_resource_tree(&client, &prod(), &Config::default())
        .await
        .unwrap();
    let json = serde_json::to_string(&prod).unwrap();
    assert!(!json.contains("m-dev-0"));

    let dev = build_cluster_resource_tree(
        &client,
        &ClusterOptions::new("default", "dev"),
        &Config::default(),
    )
    .await
    .unwrap();
    assert_eq!(dev.node_count(), 2);
    assert_eq!(dev.children[0].name, "dev-m-0");
}

#[tokio::test]
async fn test_tree_json_shape() {
    let client = fixture();
    let tree = build_cluster_resource_tree(&client, &prod(), &Config::default())
        .await
        .unwrap();
    let value = serde_json::to_value(&tree).unwrap();

    assert_eq!(value["displayName"], "prod");
    assert_eq!(value["collapseWithTab"], true);
    assert_eq!(value["collapseOnClick"], false);
    assert_eq!(value["hasReady"], true);
    assert_eq!(value["uid"], "c-prod");
    assert!(value["children"].is_array());
}

#[tokio::test]
async fn test_memoized_fetches_give_same_tree() {
    let memoized = InstrumentedClient::new(None);
    let direct = InstrumentedClient::new(None);
    let mut config = Config::default();

    let first = build_cluster_resource_tree(&memoized, &prod(), &config)
        .await
        .unwrap();
    config.ownership.memoize_fetches = false;
    let second = build_cluster_resource_tree(&direct, &prod(), &config)
        .await
        .unwrap();

    assert_eq!(first, second);
    let cached = memoized.fetches.load(Ordering::SeqCst);
    let uncached = direct.fetches.load(Ordering::SeqCst);
    assert!(cached < uncached, "cached={} uncached={}", cached, uncached);
}

#[tokio::test]
async fn test_fetch_failure_under_each_policy() {
    // HelmChartProxy fetches fail, so the release proxy loses its controller
    let client = InstrumentedClient::new(Some("HelmChartProxy"));
    let mut config = Config::default();

    let tree = build_cluster_resource_tree(&client, &prod(), &config)
        .await
        .unwrap();
    let addons = find(&tree, "AddonsGroup").unwrap();
    assert!(find(addons, "HelmChartProxy").is_none());
    assert!(find(addons, "HelmReleaseProxy").is_some());

    config.ownership.fetch_policy = FetchPolicy::Strict;
    let err = build_cluster_resource_tree(&client, &prod(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_get_custom_resource() {
    let client = fixture();
    let reference = ObjectReference::new(
        "infrastructure.cluster.x-k8s.io/v1beta1",
        "DockerMachine",
        "default",
        "prod-md-0-6d8f-a",
    );

    let value = get_custom_resource(&client, &reference).await.unwrap();
    assert_eq!(value["metadata"]["uid"], "dm-a");

    let missing = ObjectReference::new(
        "infrastructure.cluster.x-k8s.io/v1beta1",
        "DockerMachine",
        "default",
        "nope",
    );
    let err = get_custom_resource(&client, &missing).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}
