//! Request-level operations
//!
//! Each call builds everything it needs from scratch: nothing is shared
//! between requests except the client.

use crate::client::{CachingClient, ObjectClient};
use crate::config::Config;
use crate::discovery::describe_cluster;
use crate::error::Result;
use crate::resource::ObjectReference;
use crate::tree::{ResourceNode, convert_tree, inject_custom_resources};
use serde_json::Value;

/// The cluster a tree is requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOptions {
    pub namespace: String,
    pub cluster_name: String,
}

impl ClusterOptions {
    pub fn new(namespace: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cluster_name: cluster_name.into(),
        }
    }
}

/// Build the display tree of one workload cluster
///
/// Discovers the cluster, injects visualized custom resources and converts the
/// result. Fetches are memoized for the duration of the call unless disabled in
/// `config`. Errors carry a status code through [`crate::Error::status_code`].
pub async fn build_cluster_resource_tree<C: ObjectClient + ?Sized>(
    client: &C,
    options: &ClusterOptions,
    config: &Config,
) -> Result<ResourceNode> {
    if config.ownership.memoize_fetches {
        let cached = CachingClient::new(client);
        let tree = build_tree(&cached, options, config).await;
        tracing::debug!("Fetched {} distinct objects", cached.cached_len().await);
        tree
    } else {
        build_tree(client, options, config).await
    }
}

async fn build_tree<C: ObjectClient + ?Sized>(
    client: &C,
    options: &ClusterOptions,
    config: &Config,
) -> Result<ResourceNode> {
    let mut objects = describe_cluster(
        client,
        &options.namespace,
        &options.cluster_name,
        &config.discovery_options(),
    )
    .await?;

    let overrides = inject_custom_resources(
        client,
        &mut objects,
        &options.namespace,
        &options.cluster_name,
        &config.inject_options(),
    )
    .await?;

    let tree_options = config.tree_options().with_overrides(overrides);
    let root = convert_tree(&objects, &tree_options);
    tracing::info!(
        "Built tree for {}/{} with {} nodes",
        options.namespace,
        options.cluster_name,
        root.node_count()
    );
    Ok(root)
}

/// Fetch one object and return it as raw JSON
pub async fn get_custom_resource<C: ObjectClient + ?Sized>(
    client: &C,
    reference: &ObjectReference,
) -> Result<Value> {
    let object = client.fetch_by_reference(reference).await?;
    Ok(object.raw)
}
