//! Offline object source
//!
//! Loads a YAML dump of a management cluster (`kubectl get ... -o yaml`, possibly
//! several documents or `kind: List` wrappers) and serves it through
//! [`ObjectClient`], so trees can be rendered without a live API server.
//!
//! Lookups ignore the API version: the API server converts between served
//! versions, so an object is visible under every version of its group.

use super::selector::parse_selector;
use kube::core::SelectorExt;
use super::{CrdInfo, ListOptions, ObjectClient};
use crate::error::{Error, Result};
use crate::resource::{ObjectReference, Resource, split_api_version};
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SnapshotClient {
    objects: Vec<Resource>,
    crds: Vec<CrdInfo>,
}

impl SnapshotClient {
    /// Load a snapshot file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::snapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse one or more YAML documents
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let mut values = Vec::new();
        for document in serde_yaml::Deserializer::from_str(contents) {
            let value = Value::deserialize(document)
                .map_err(|e| Error::snapshot(format!("invalid YAML document: {}", e)))?;
            if !value.is_null() {
                values.push(value);
            }
        }
        Self::from_values(values)
    }

    /// Build from already-parsed objects; `List` wrappers are flattened
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut client = Self::default();
        for value in values {
            client.insert(value)?;
        }
        tracing::debug!(
            "Loaded snapshot with {} objects and {} CRDs",
            client.objects.len(),
            client.crds.len()
        );
        Ok(client)
    }

    fn insert(&mut self, value: Value) -> Result<()> {
        let kind = value.get("kind").and_then(|k| k.as_str()).unwrap_or("");
        if kind == "List" || (kind.ends_with("List") && value.get("items").is_some()) {
            if let Some(items) = value.get("items").and_then(|i| i.as_array()) {
                for item in items {
                    self.insert(item.clone())?;
                }
            }
            return Ok(());
        }

        if kind == "CustomResourceDefinition" {
            let crd: CustomResourceDefinition = serde_json::from_value(value.clone())
                .map_err(|e| Error::snapshot(format!("invalid CRD: {}", e)))?;
            self.crds.push(CrdInfo::from(&crd));
        }
        self.objects.push(Resource::from_value(value)?);
        Ok(())
    }

    pub fn objects(&self) -> &[Resource] {
        &self.objects
    }

    fn namespace_matches(object: &Resource, namespace: &str) -> bool {
        // cluster-scoped objects have no namespace and match any request
        object.namespace.is_empty() || object.namespace == namespace
    }
}

#[async_trait]
impl ObjectClient for SnapshotClient {
    async fn fetch_by_reference(&self, reference: &ObjectReference) -> Result<Resource> {
        self.objects
            .iter()
            .find(|o| {
                o.kind == reference.kind
                    && o.group() == reference.group()
                    && o.name == reference.name
                    && Self::namespace_matches(o, &reference.namespace)
            })
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} not found in snapshot", reference)))
    }

    async fn list_crds(&self, label_selector: &str) -> Result<Vec<CrdInfo>> {
        let selector = parse_selector(label_selector);
        Ok(self
            .crds
            .iter()
            .filter(|crd| selector.matches(&crd.labels))
            .cloned()
            .collect())
    }

    async fn list_objects(
        &self,
        api_version: &str,
        kind: &str,
        options: &ListOptions,
    ) -> Result<Vec<Resource>> {
        let (group, _) = split_api_version(api_version);
        let selector = parse_selector(options.label_selector.as_deref().unwrap_or_default());
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == kind && o.group() == group)
            .filter(|o| match &options.namespace {
                Some(ns) => o.namespace == *ns,
                None => true,
            })
            .filter(|o| selector.matches(&o.labels))
            .cloned()
            .collect())
    }
}
