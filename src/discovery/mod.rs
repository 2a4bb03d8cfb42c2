//! Cluster discovery
//!
//! Builds the raw owner-based [`ObjectTree`] of a workload cluster: the Cluster
//! object at the root, every provider-managed object labelled with the cluster
//! name below its owner, and the ClusterResourceSets bound to the cluster.

use crate::client::{ListOptions, ObjectClient};
use crate::error::Result;
use crate::resource::{CLUSTER_NAME_LABEL, ObjectReference, ObjectTree, PROVIDER_LABEL, Resource};
use crate::tree::grouping::{CRS_GROUP_KIND, CRS_GROUP_NAME};
use std::collections::HashMap;

pub const CLUSTER_API_VERSION: &str = "cluster.x-k8s.io/v1beta1";
pub const ADDONS_API_VERSION: &str = "addons.cluster.x-k8s.io/v1beta1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Add the ClusterResourceSets bound to the cluster under a virtual group
    pub show_cluster_resource_sets: bool,
    pub cluster_name_label: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            show_cluster_resource_sets: true,
            cluster_name_label: CLUSTER_NAME_LABEL.to_string(),
        }
    }
}

/// Discover the objects of cluster `namespace/name`
///
/// A missing Cluster is `Error::NotFound`.
pub async fn describe_cluster<C: ObjectClient + ?Sized>(
    client: &C,
    namespace: &str,
    name: &str,
    options: &DiscoveryOptions,
) -> Result<ObjectTree> {
    let reference = ObjectReference::new(CLUSTER_API_VERSION, "Cluster", namespace, name);
    let cluster = client.fetch_by_reference(&reference).await?;
    tracing::info!("Describing cluster {}", reference);

    let objects = list_cluster_objects(client, &cluster, options).await?;
    let mut tree = ObjectTree::new(cluster);
    attach_by_owner(&mut tree, objects);

    if options.show_cluster_resource_sets {
        add_cluster_resource_sets(client, &mut tree).await?;
    }

    tracing::debug!("Discovered {} objects", tree.object_count());
    Ok(tree)
}

/// List instances of every provider CRD labelled with the cluster name
async fn list_cluster_objects<C: ObjectClient + ?Sized>(
    client: &C,
    cluster: &Resource,
    options: &DiscoveryOptions,
) -> Result<Vec<Resource>> {
    let crds = client.list_crds(PROVIDER_LABEL).await?;
    let selector = ListOptions::in_namespace(&cluster.namespace)
        .with_label(&options.cluster_name_label, &cluster.name);

    // the same object is served under every version of its CRD
    let mut by_uid: HashMap<String, Resource> = HashMap::new();
    for crd in &crds {
        for api_version in crd.api_versions() {
            for object in client.list_objects(&api_version, &crd.kind, &selector).await? {
                if object.uid != cluster.uid {
                    by_uid.entry(object.uid.clone()).or_insert(object);
                }
            }
        }
    }

    let mut objects: Vec<Resource> = by_uid.into_values().collect();
    objects.sort_by(|a, b| (&a.kind, &a.name).cmp(&(&b.kind, &b.name)));
    Ok(objects)
}

/// Parent of `object` among the discovered objects: its controller, else its first known owner
fn owner_uid<'a>(object: &'a Resource, known: &HashMap<&str, &Resource>) -> Option<&'a str> {
    if let Some(controller) = object.controller_ref() {
        if known.contains_key(controller.uid.as_str()) {
            return Some(&controller.uid);
        }
    }
    object
        .owner_references
        .iter()
        .map(|r| r.uid.as_str())
        .find(|uid| known.contains_key(uid))
}

/// Attach objects below their owners, owners first
///
/// Objects whose owners are not part of the cluster, or whose owner chain never
/// reaches the tree, end up under the root.
fn attach_by_owner(tree: &mut ObjectTree, objects: Vec<Resource>) {
    let root_uid = tree.root().uid.clone();
    let parents: HashMap<String, String> = {
        let mut known: HashMap<&str, &Resource> =
            objects.iter().map(|o| (o.uid.as_str(), o)).collect();
        known.insert(root_uid.as_str(), tree.root());
        objects
            .iter()
            .map(|o| {
                let parent = owner_uid(o, &known).unwrap_or(root_uid.as_str());
                (o.uid.clone(), parent.to_string())
            })
            .collect()
    };

    let mut pending = objects;
    loop {
        let before = pending.len();
        let mut blocked = Vec::new();
        for object in pending {
            let parent_uid = parents.get(&object.uid).map_or(root_uid.as_str(), String::as_str);
            match tree.get_object(parent_uid).cloned() {
                Some(parent) => {
                    tree.add(&parent, object);
                }
                None => blocked.push(object),
            }
        }
        if blocked.is_empty() {
            return;
        }
        if blocked.len() == before {
            // owner cycle among the remaining objects
            let root = tree.root().clone();
            for object in blocked {
                tracing::warn!("Could not place {} below its owner, attaching to root", object);
                tree.add(&root, object);
            }
            return;
        }
        pending = blocked;
    }
}

/// Put the ClusterResourceSets bound to the cluster under a virtual group
async fn add_cluster_resource_sets<C: ObjectClient + ?Sized>(
    client: &C,
    tree: &mut ObjectTree,
) -> Result<()> {
    let cluster = tree.root().clone();
    let bindings = client
        .list_objects(
            ADDONS_API_VERSION,
            "ClusterResourceSetBinding",
            &ListOptions::in_namespace(&cluster.namespace),
        )
        .await?;

    let Some(binding) = bindings.iter().find(|b| {
        b.name == cluster.name || b.field_str("spec.clusterName") == Some(cluster.name.as_str())
    }) else {
        return Ok(());
    };

    let names: Vec<&str> = binding
        .raw
        .pointer("/spec/bindings")
        .and_then(|b| b.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("clusterResourceSetName").and_then(|n| n.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let mut sets = Vec::new();
    for name in names {
        let reference =
            ObjectReference::new(ADDONS_API_VERSION, "ClusterResourceSet", &cluster.namespace, name);
        match client.fetch_by_reference(&reference).await {
            Ok(set) => sets.push(set),
            Err(e) if e.is_not_found() => {
                tracing::warn!("Binding {} references missing {}", binding, reference);
            }
            Err(e) => return Err(e),
        }
    }
    if sets.is_empty() {
        return Ok(());
    }

    let group = Resource::virtual_object(&cluster.namespace, CRS_GROUP_KIND, CRS_GROUP_NAME);
    tree.add(&cluster, group.clone());
    for set in sets {
        if !tree.add(&group, set.clone()) {
            tracing::debug!("{} already in tree", set);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(kind: &str, name: &str, uid: &str, owners: serde_json::Value) -> Resource {
        Resource::from_value(json!({
            "apiVersion": "cluster.x-k8s.io/v1beta1",
            "kind": kind,
            "metadata": { "name": name, "namespace": "default", "uid": uid, "ownerReferences": owners }
        }))
        .unwrap()
    }

    fn owner(kind: &str, name: &str, uid: &str, controller: bool) -> serde_json::Value {
        json!({ "apiVersion": "cluster.x-k8s.io/v1beta1", "kind": kind, "name": name, "uid": uid, "controller": controller })
    }

    #[test]
    fn test_attach_by_owner_places_children_after_parents() {
        let cluster = object("Cluster", "prod", "c", json!([]));
        let md = object("MachineDeployment", "md", "md", json!([owner("Cluster", "prod", "c", false)]));
        let ms = object("MachineSet", "ms", "ms", json!([owner("MachineDeployment", "md", "md", true)]));
        let m = object(
            "Machine",
            "m",
            "m",
            json!([owner("Cluster", "prod", "c", false), owner("MachineSet", "ms", "ms", true)]),
        );
        let orphan = object("MachineHealthCheck", "mhc", "mhc", json!([]));

        let mut tree = ObjectTree::new(cluster);
        // children listed before their parents
        attach_by_owner(&mut tree, vec![m, ms, orphan, md]);

        assert_eq!(tree.object_count(), 5);
        let under_root: Vec<&str> = tree
            .get_objects_by_parent("c")
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(under_root, vec!["mhc", "md"]);
        assert_eq!(tree.get_objects_by_parent("ms")[0].name, "m");
    }

    #[test]
    fn test_attach_by_owner_breaks_cycles() {
        let cluster = object("Cluster", "prod", "c", json!([]));
        let a = object("Widget", "a", "a", json!([owner("Widget", "b", "b", true)]));
        let b = object("Widget", "b", "b", json!([owner("Widget", "a", "a", true)]));

        let mut tree = ObjectTree::new(cluster);
        attach_by_owner(&mut tree, vec![a, b]);
        assert_eq!(tree.object_count(), 3);
        assert_eq!(tree.get_objects_by_parent("c").len(), 2);
    }
}
