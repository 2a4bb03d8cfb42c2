//! Kubernetes API client
//!
//! Connects to the management cluster and serves [`ObjectClient`] through the
//! dynamic API, resolving each kind with API discovery so any CRD can be
//! fetched without compiled-in types.

use super::{CrdInfo, ListOptions, ObjectClient};
use crate::error::{Error, Result, is_not_found};
use crate::resource::{ObjectReference, Resource, split_api_version};
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, DynamicObject, ListParams};
use kube::config::Kubeconfig;
use kube::core::{GroupVersionKind, TypeMeta};
use kube::discovery::{ApiResource, Scope, pinned_kind};
use kube::{Client, Config};

/// Where the management cluster is, as seen from the local kubeconfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementContext {
    pub context: String,
    pub cluster: String,
    pub namespace: String,
}

/// Dynamic-object client backed by a live API server
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default kubeconfig loading strategy
    ///
    /// 1. In-cluster config (if running in a pod)
    /// 2. KUBECONFIG environment variable
    /// 3. ~/.kube/config
    pub async fn infer() -> Result<Self> {
        let config = Config::infer()
            .await
            .map_err(|e| Error::internal(format!("failed to load kubeconfig: {}", e)))?;
        let client = Client::try_from(config)
            .map_err(|e| Error::dependency("failed to create Kubernetes client", e))?;
        Ok(Self::new(client))
    }

    /// Get a reference to the underlying Kubernetes client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolve the current context of the local kubeconfig
    ///
    /// A kubeconfig without a usable current context is reported as not found.
    pub fn current_context() -> Result<ManagementContext> {
        let kubeconfig = Kubeconfig::read()
            .map_err(|e| Error::not_found(format!("failed to read kubeconfig: {}", e)))?;
        let current = kubeconfig
            .current_context
            .clone()
            .ok_or_else(|| Error::not_found("current context not found"))?;
        let context = kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == current)
            .and_then(|c| c.context.as_ref())
            .ok_or_else(|| Error::not_found("current context not found"))?;

        Ok(ManagementContext {
            context: current,
            cluster: context.cluster.clone(),
            namespace: context.namespace.clone().unwrap_or_default(),
        })
    }

    async fn resolve(&self, api_version: &str, kind: &str) -> Result<(ApiResource, Scope)> {
        let (group, version) = split_api_version(api_version);
        let gvk = GroupVersionKind::gvk(group, version, kind);
        let (resource, capabilities) = pinned_kind(&self.client, &gvk)
            .await
            .map_err(|e| match e {
                kube::Error::Discovery(_) => {
                    Error::not_found(format!("{} {} is not served", api_version, kind))
                }
                other => Error::dependency(
                    format!("failed to discover {} {}", api_version, kind),
                    other,
                ),
            })?;
        Ok((resource, capabilities.scope))
    }

    fn api(&self, resource: &ApiResource, scope: &Scope, namespace: Option<&str>) -> Api<DynamicObject> {
        match (scope, namespace) {
            (Scope::Namespaced, Some(ns)) if !ns.is_empty() => {
                Api::namespaced_with(self.client.clone(), ns, resource)
            }
            _ => Api::all_with(self.client.clone(), resource),
        }
    }
}

/// Convert a dynamic object, filling in type information that list items omit
fn to_resource(mut object: DynamicObject, resource: &ApiResource) -> Result<Resource> {
    if object.types.is_none() {
        object.types = Some(TypeMeta {
            api_version: resource.api_version.clone(),
            kind: resource.kind.clone(),
        });
    }
    let value = serde_json::to_value(&object)
        .map_err(|e| Error::internal(format!("failed to serialize object to JSON: {}", e)))?;
    Resource::from_value(value)
}

#[async_trait]
impl ObjectClient for KubeClient {
    async fn fetch_by_reference(&self, reference: &ObjectReference) -> Result<Resource> {
        let (resource, scope) = self.resolve(&reference.api_version, &reference.kind).await?;
        let api = self.api(&resource, &scope, Some(&reference.namespace));

        tracing::debug!("Fetching {}", reference);
        let object = api.get(&reference.name).await.map_err(|e| {
            if is_not_found(&e) {
                Error::not_found(format!("{} not found", reference))
            } else {
                Error::dependency(format!("failed to fetch {}", reference), e)
            }
        })?;
        to_resource(object, &resource)
    }

    async fn list_crds(&self, label_selector: &str) -> Result<Vec<CrdInfo>> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let crds = api
            .list(&ListParams::default().labels(label_selector))
            .await
            .map_err(|e| Error::dependency("failed to list CustomResourceDefinitions", e))?;
        Ok(crds.items.iter().map(CrdInfo::from).collect())
    }

    async fn list_objects(
        &self,
        api_version: &str,
        kind: &str,
        options: &ListOptions,
    ) -> Result<Vec<Resource>> {
        let (resource, scope) = match self.resolve(api_version, kind).await {
            Ok(resolved) => resolved,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Skipping {} {}: {}", api_version, kind, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        let api = self.api(&resource, &scope, options.namespace.as_deref());

        let mut params = ListParams::default();
        if let Some(selector) = options.label_selector.as_deref() {
            params = params.labels(selector);
        }

        let list = match api.list(&params).await {
            Ok(list) => list,
            Err(e) if is_not_found(&e) => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::dependency(
                    format!("failed to list {} {}", api_version, kind),
                    e,
                ));
            }
        };

        list.items
            .into_iter()
            .map(|object| to_resource(object, &resource))
            .collect()
    }
}
