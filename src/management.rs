//! Management cluster overview
//!
//! One root for the management cluster, one child per workload Cluster it manages.

use crate::client::{ListOptions, ManagementContext, ObjectClient};
use crate::discovery::CLUSTER_API_VERSION;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiClusterNode {
    pub name: String,
    pub namespace: String,
    /// Kind of the cluster's infrastructure object, e.g. `DockerCluster`
    pub infrastructure_provider: String,
    pub is_management: bool,
    pub phase: String,
    pub ready: bool,
    pub children: Vec<MultiClusterNode>,
}

/// Build the overview of every workload cluster, sorted by name
pub async fn build_management_cluster_tree<C: ObjectClient + ?Sized>(
    client: &C,
    context: &ManagementContext,
) -> Result<MultiClusterNode> {
    let mut root = MultiClusterNode {
        name: context.cluster.clone(),
        namespace: context.namespace.clone(),
        is_management: true,
        ..Default::default()
    };

    let mut clusters = client
        .list_objects(CLUSTER_API_VERSION, "Cluster", &ListOptions::default())
        .await?;
    if clusters.is_empty() {
        tracing::debug!("No workload clusters found");
        return Ok(root);
    }
    clusters.sort_by(|a, b| (&a.name, &a.namespace).cmp(&(&b.name, &b.namespace)));

    root.children = clusters
        .iter()
        .map(|cluster| MultiClusterNode {
            name: cluster.name.clone(),
            namespace: cluster.namespace.clone(),
            infrastructure_provider: cluster
                .field_str("spec.infrastructureRef.kind")
                .unwrap_or_default()
                .to_string(),
            is_management: false,
            phase: cluster.field_str("status.phase").unwrap_or_default().to_string(),
            ready: cluster.ready_condition().is_some_and(|c| c.status),
            children: Vec::new(),
        })
        .collect();

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SnapshotClient;

    const CLUSTERS: &str = r#"
apiVersion: cluster.x-k8s.io/v1beta1
kind: Cluster
metadata: { name: zeta, namespace: default, uid: c-z }
spec:
  infrastructureRef: { apiVersion: infrastructure.cluster.x-k8s.io/v1beta1, kind: DockerCluster, name: zeta }
status:
  phase: Provisioned
  conditions: [{ type: Ready, status: "True" }]
---
apiVersion: cluster.x-k8s.io/v1beta1
kind: Cluster
metadata: { name: alpha, namespace: team-a, uid: c-a }
status:
  phase: Provisioning
"#;

    fn context() -> ManagementContext {
        ManagementContext {
            context: "kind-capi".to_string(),
            cluster: "kind-capi".to_string(),
            namespace: "default".to_string(),
        }
    }

    #[tokio::test]
    async fn test_clusters_sorted_with_status() {
        let client = SnapshotClient::from_yaml(CLUSTERS).unwrap();
        let root = build_management_cluster_tree(&client, &context()).await.unwrap();

        assert!(root.is_management);
        assert_eq!(root.name, "kind-capi");
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let alpha = &root.children[0];
        assert_eq!(alpha.phase, "Provisioning");
        assert!(!alpha.ready);
        assert_eq!(alpha.infrastructure_provider, "");

        let zeta = &root.children[1];
        assert!(zeta.ready);
        assert_eq!(zeta.infrastructure_provider, "DockerCluster");
        assert!(!zeta.is_management);
    }

    #[tokio::test]
    async fn test_no_clusters() {
        let client = SnapshotClient::default();
        let root = build_management_cluster_tree(&client, &context()).await.unwrap();
        assert!(root.children.is_empty());

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["isManagement"], true);
        assert_eq!(json["infrastructureProvider"], "");
    }
}
