//! Custom resource injection
//!
//! Cluster discovery only knows the Cluster API kinds. CRDs labelled for
//! visualization contribute extra objects, which are attached to the raw tree
//! under their nearest owner before conversion.

use super::options::ProviderType;
use crate::client::{ListOptions, ObjectClient};
use crate::error::{Error, Result};
use crate::ownership::{OwnerPick, WalkLimits, pick_owner};
use crate::resource::{CLUSTER_NAME_LABEL, ObjectTree, Resource};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_VISUALIZE_LABEL: &str = "visualizer.cluster.x-k8s.io";
pub const DEFAULT_PROVIDER_TYPE_LABEL: &str = "visualizer.cluster.x-k8s.io/provider-type";

/// Label keys and walk limits used while injecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectOptions {
    /// CRDs carrying this label (any value) are injected
    pub visualize_label: String,
    /// Optional CRD label forcing the provider of the CRD's kind
    pub provider_type_label: String,
    /// Instance label naming the owning Cluster
    pub cluster_name_label: String,
    pub limits: WalkLimits,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            visualize_label: DEFAULT_VISUALIZE_LABEL.to_string(),
            provider_type_label: DEFAULT_PROVIDER_TYPE_LABEL.to_string(),
            cluster_name_label: CLUSTER_NAME_LABEL.to_string(),
            limits: WalkLimits::default(),
        }
    }
}

/// Add instances of visualized CRDs belonging to `cluster_name` to `tree`
///
/// Returns the kind to provider overrides declared on those CRDs. Every
/// provider label is validated before anything is listed, so an invalid value
/// fails the whole injection without touching the tree.
pub async fn inject_custom_resources<C: ObjectClient + ?Sized>(
    client: &C,
    tree: &mut ObjectTree,
    namespace: &str,
    cluster_name: &str,
    options: &InjectOptions,
) -> Result<BTreeMap<String, ProviderType>> {
    tracing::debug!(
        "Injecting custom resources for cluster {}/{}",
        namespace,
        cluster_name
    );
    let crds = client.list_crds(&options.visualize_label).await?;

    let mut overrides = BTreeMap::new();
    for crd in &crds {
        if let Some(value) = crd.labels.get(&options.provider_type_label) {
            let provider = value.parse::<ProviderType>().map_err(|e| {
                Error::invalid_configuration(format!("CRD {}: {}", crd.name, e))
            })?;
            overrides.insert(crd.kind.clone(), provider);
        }
    }

    let selector =
        ListOptions::in_namespace(namespace).with_label(&options.cluster_name_label, cluster_name);
    let mut objects = Vec::new();
    for crd in &crds {
        for api_version in crd.api_versions() {
            let mut listed = client.list_objects(&api_version, &crd.kind, &selector).await?;
            tracing::debug!("Found {} {} in {}", listed.len(), crd.kind, api_version);
            objects.append(&mut listed);
        }
    }

    for object in objects {
        ensure_connected(client, tree, object, options.limits).await?;
    }

    Ok(overrides)
}

/// Attach `object` to the tree, connecting its missing ancestors first
///
/// Objects without an owner, or with several owners and no controller, go
/// under the tree root. A cyclic owner chain is treated the same way.
pub async fn ensure_connected<C: ObjectClient + ?Sized>(
    client: &C,
    tree: &mut ObjectTree,
    object: Resource,
    limits: WalkLimits,
) -> Result<()> {
    if tree.contains(&object.uid) {
        tracing::trace!("{} already in tree", object);
        return Ok(());
    }

    // chain[i + 1] is the owner of chain[i]; the last entry's owner is in the tree
    let mut seen: HashSet<String> = HashSet::from([object.uid.clone()]);
    let mut chain = vec![object];
    let mut anchor = loop {
        if chain.len() > limits.max_depth {
            return Err(Error::internal(format!(
                "owner chain of {} is deeper than {}",
                chain[0], limits.max_depth
            )));
        }
        let Some(current) = chain.last() else {
            return Err(Error::internal("empty owner chain"));
        };

        let owner = match pick_owner(client, current, limits).await? {
            OwnerPick::Owner(owner) => owner,
            OwnerPick::None => break tree.root().clone(),
            OwnerPick::Ambiguous(owners) => {
                tracing::warn!(
                    "{} has ambiguous owners {:?}, attaching to {}",
                    current,
                    owners,
                    tree.root()
                );
                break tree.root().clone();
            }
        };

        if tree.contains(&owner.uid) {
            break owner;
        }
        if !seen.insert(owner.uid.clone()) {
            tracing::warn!("Owner cycle through {}, attaching to {}", owner, tree.root());
            break tree.root().clone();
        }
        chain.push(owner);
    };

    while let Some(child) = chain.pop() {
        let label = child.to_string();
        if !tree.add(&anchor, child.clone()) {
            return Err(Error::internal(format!(
                "failed to add {} to tree under {}",
                label, anchor
            )));
        }
        anchor = child;
    }
    Ok(())
}
