//! Object access for the tree engine
//!
//! The engine only needs three read operations from the management cluster:
//! fetch a single object by reference, list CRDs by label, and list instances of
//! a type. They sit behind [`ObjectClient`] so the engine runs the same against a
//! live API server ([`KubeClient`]) or an offline YAML dump ([`SnapshotClient`]).

pub mod cache;
pub mod kube;
pub mod selector;
pub mod snapshot;

pub use cache::CachingClient;
pub use self::kube::{KubeClient, ManagementContext};
pub use snapshot::SnapshotClient;

use crate::error::Result;
use crate::resource::{ObjectReference, Resource};
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
#[cfg(test)]
use mockall::automock;
use std::collections::BTreeMap;

/// The parts of a CustomResourceDefinition the engine reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrdInfo {
    pub name: String,
    pub kind: String,
    pub group: String,
    pub versions: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl CrdInfo {
    pub fn api_versions(&self) -> impl Iterator<Item = String> + '_ {
        self.versions
            .iter()
            .map(|version| format!("{}/{}", self.group, version))
    }
}

impl From<&CustomResourceDefinition> for CrdInfo {
    fn from(crd: &CustomResourceDefinition) -> Self {
        Self {
            name: crd.metadata.name.clone().unwrap_or_default(),
            kind: crd.spec.names.kind.clone(),
            group: crd.spec.group.clone(),
            versions: crd.spec.versions.iter().map(|v| v.name.clone()).collect(),
            labels: crd.metadata.labels.clone().unwrap_or_default(),
        }
    }
}

/// Filters for listing objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Restrict to one namespace; `None` lists across all namespaces
    pub namespace: Option<String>,
    /// Kubernetes label selector, e.g. `cluster.x-k8s.io/cluster-name=prod`
    pub label_selector: Option<String>,
}

impl ListOptions {
    pub fn in_namespace(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            label_selector: None,
        }
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        let term = format!("{}={}", key, value);
        self.label_selector = Some(match self.label_selector {
            Some(existing) if !existing.is_empty() => format!("{},{}", existing, term),
            _ => term,
        });
        self
    }
}

/// Read-only access to cluster objects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Fetch one object; a missing object is `Error::NotFound`
    async fn fetch_by_reference(&self, reference: &ObjectReference) -> Result<Resource>;

    /// List CRDs matching a label selector
    async fn list_crds(&self, label_selector: &str) -> Result<Vec<CrdInfo>>;

    /// List instances of `kind` in `api_version`
    ///
    /// A type that is not served returns an empty list rather than an error.
    async fn list_objects(
        &self,
        api_version: &str,
        kind: &str,
        options: &ListOptions,
    ) -> Result<Vec<Resource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_label_chaining() {
        let opts = ListOptions::in_namespace("default")
            .with_label("cluster.x-k8s.io/cluster-name", "prod")
            .with_label("tier", "web");
        assert_eq!(opts.namespace.as_deref(), Some("default"));
        assert_eq!(
            opts.label_selector.as_deref(),
            Some("cluster.x-k8s.io/cluster-name=prod,tier=web")
        );
    }

    #[test]
    fn test_crd_api_versions() {
        let crd = CrdInfo {
            name: "widgets.addons.cluster.x-k8s.io".to_string(),
            kind: "Widget".to_string(),
            group: "addons.cluster.x-k8s.io".to_string(),
            versions: vec!["v1alpha1".to_string(), "v1beta1".to_string()],
            labels: BTreeMap::new(),
        };
        let versions: Vec<String> = crd.api_versions().collect();
        assert_eq!(
            versions,
            vec![
                "addons.cluster.x-k8s.io/v1alpha1",
                "addons.cluster.x-k8s.io/v1beta1"
            ]
        );
    }
}
