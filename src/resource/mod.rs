//! Resource model
//!
//! A read-only view over the Kubernetes objects that make up a workload cluster.
//! Objects are kept as raw JSON plus the handful of metadata fields the tree engine
//! needs (kind/group/version, owner references, readiness, virtual flag), so the
//! engine never binds to a concrete client-library type.

mod object_tree;

pub use object_tree::ObjectTree;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;

/// Annotation marking a synthetic aggregation node with no backing API object
pub const VIRTUAL_OBJECT_ANNOTATION: &str = "tree.cluster.x-k8s.io.io/virtual-object";
/// Annotation carrying the display fallback name of a virtual node
pub const META_NAME_ANNOTATION: &str = "tree.cluster.x-k8s.io.io/meta-name";
/// API group used for virtual nodes
pub const VIRTUAL_GROUP: &str = "virtual.cluster.x-k8s.io";
pub const VIRTUAL_API_VERSION: &str = "virtual.cluster.x-k8s.io/v1beta1";
/// Domain marker shared by every Cluster API group
pub const CAPI_GROUP_MARKER: &str = "cluster.x-k8s.io";
/// Label linking an object to the Cluster it belongs to
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";
/// Label set on CRDs installed by a Cluster API provider
pub const PROVIDER_LABEL: &str = "cluster.x-k8s.io/provider";

/// A declared owner of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
}

impl OwnerReference {
    /// Reference to the owner, assuming it lives in the owned object's namespace
    pub fn to_object_reference(&self, namespace: &str) -> ObjectReference {
        ObjectReference {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            namespace: namespace.to_string(),
        }
    }

    pub fn is_controller(&self) -> bool {
        self.controller.unwrap_or(false)
    }
}

/// Reference used to fetch a single object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectReference {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn group(&self) -> &str {
        split_api_version(&self.api_version).0
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// Severity of a condition, ordered from least to most severe
///
/// Serialized as the plain condition string, with `""` for no severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    #[serde(rename = "")]
    None,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a condition severity; unknown values count as no severity
    pub fn parse(s: &str) -> Self {
        match s {
            "Info" => Severity::Info,
            "Warning" => Severity::Warning,
            "Error" => Severity::Error,
            _ => Severity::None,
        }
    }

    /// Return the more severe of the two (Error > Warning > Info > none)
    pub fn worst(self, other: Severity) -> Severity {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// The Ready condition of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyCondition {
    pub status: bool,
    pub severity: Severity,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// A Kubernetes object as seen by the tree engine
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub owner_references: Vec<OwnerReference>,
    /// The full object as returned by the API server
    pub raw: Value,
}

impl Resource {
    /// Build a resource from its JSON representation
    ///
    /// `kind` and `apiVersion` are required; objects without a UID are rejected
    /// since every graph edge is keyed by it.
    pub fn from_value(raw: Value) -> Result<Self> {
        let kind = raw
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| Error::internal("object is missing kind"))?
            .to_string();
        let api_version = raw
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::internal(format!("{} object is missing apiVersion", kind)))?
            .to_string();

        let metadata = raw.get("metadata").cloned().unwrap_or(Value::Null);
        let name = str_field(&metadata, "name");
        let namespace = str_field(&metadata, "namespace");
        let uid = str_field(&metadata, "uid");
        if uid.is_empty() {
            return Err(Error::internal(format!(
                "{} {}/{} has no uid",
                kind, namespace, name
            )));
        }

        let labels = string_map(metadata.get("labels"));
        let annotations = string_map(metadata.get("annotations"));
        let owner_references = metadata
            .get("ownerReferences")
            .cloned()
            .map(serde_json::from_value::<Vec<OwnerReference>>)
            .transpose()
            .map_err(|e| {
                Error::internal(format!(
                    "malformed ownerReferences on {} {}/{}: {}",
                    kind, namespace, name, e
                ))
            })?
            .unwrap_or_default();

        Ok(Self {
            api_version,
            kind,
            namespace,
            name,
            uid,
            labels,
            annotations,
            owner_references,
            raw,
        })
    }

    /// Create a virtual aggregation node
    pub fn virtual_object(namespace: &str, kind: &str, name: &str) -> Self {
        let uid = format!("virtual:{}:{}/{}", kind, namespace, name);
        let mut annotations = BTreeMap::new();
        annotations.insert(VIRTUAL_OBJECT_ANNOTATION.to_string(), "True".to_string());
        annotations.insert(META_NAME_ANNOTATION.to_string(), name.to_string());

        let raw = json!({
            "apiVersion": VIRTUAL_API_VERSION,
            "kind": kind,
            "metadata": {
                "name": name,
                "namespace": namespace,
                "uid": uid,
                "annotations": annotations,
            },
        });

        Self {
            api_version: VIRTUAL_API_VERSION.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid,
            labels: BTreeMap::new(),
            annotations,
            owner_references: Vec::new(),
            raw,
        }
    }

    pub fn group(&self) -> &str {
        split_api_version(&self.api_version).0
    }

    pub fn version(&self) -> &str {
        split_api_version(&self.api_version).1
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Whether this is a synthetic aggregation node
    pub fn is_virtual(&self) -> bool {
        self.annotations
            .get(VIRTUAL_OBJECT_ANNOTATION)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn meta_name(&self) -> Option<&str> {
        self.annotations
            .get(META_NAME_ANNOTATION)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Name shown in the dashboard: the meta name for virtual or unnamed objects
    pub fn display_name(&self) -> String {
        match self.meta_name() {
            Some(meta) if self.name.is_empty() || self.is_virtual() => meta.to_string(),
            _ => self.name.clone(),
        }
    }

    /// The owner reference flagged as controller, if any
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.is_controller())
    }

    /// Reference that fetches this object again
    pub fn reference(&self) -> ObjectReference {
        ObjectReference::new(&self.api_version, &self.kind, &self.namespace, &self.name)
    }

    /// Find the `Ready` condition in `status.conditions`
    pub fn ready_condition(&self) -> Option<ReadyCondition> {
        let conditions = self
            .raw
            .get("status")
            .and_then(|s| s.get("conditions"))
            .and_then(|c| c.as_array())?;

        conditions
            .iter()
            .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("Ready"))
            .map(|c| ReadyCondition {
                status: c.get("status").and_then(|s| s.as_str()) == Some("True"),
                severity: Severity::parse(
                    c.get("severity").and_then(|s| s.as_str()).unwrap_or(""),
                ),
                reason: c
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .map(|s| s.to_string()),
                message: c
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string()),
            })
    }

    /// Look up a string at a dotted path inside the raw object, e.g. `status.phase`
    pub fn field_str(&self, path: &str) -> Option<&str> {
        path.split('.')
            .try_fold(&self.raw, |value, key| value.get(key))
            .and_then(|v| v.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Split `group/version` into its parts; core objects have an empty group
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
