//! Owner selection for objects that are not yet part of a tree

use super::graph::{FetchPolicy, OwnershipGraph, WalkLimits};
use crate::client::ObjectClient;
use crate::error::Result;
use crate::resource::Resource;

/// Outcome of choosing a parent for an object
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerPick {
    /// The object has no owners and belongs under the tree root
    None,
    /// The most specific owner
    Owner(Resource),
    /// Several nearest owners and no controller reference to break the tie
    Ambiguous(Vec<String>),
}

impl OwnerPick {
    pub fn owner(&self) -> Option<&Resource> {
        match self {
            OwnerPick::Owner(owner) => Some(owner),
            _ => None,
        }
    }
}

/// Choose the single most specific owner of `object`
///
/// Builds a fresh ownership graph rooted at the object and reduces it. With
/// more than one nearest owner, the controller reference wins.
pub async fn pick_owner<C: ObjectClient + ?Sized>(
    client: &C,
    object: &Resource,
    limits: WalkLimits,
) -> Result<OwnerPick> {
    let mut graph = OwnershipGraph::build(client, object, limits).await?;
    graph.remove_transitive_owners(&object.uid);

    let owners: Vec<String> = graph.owners_of(&object.uid).cloned().collect();
    match owners.as_slice() {
        [] => Ok(OwnerPick::None),
        [uid] => Ok(graph
            .objects
            .get(uid)
            .cloned()
            .map_or(OwnerPick::None, OwnerPick::Owner)),
        _ => {
            let Some(controller) = object.controller_ref() else {
                tracing::warn!(
                    "{} has {} owners and no controller reference",
                    object,
                    owners.len()
                );
                return Ok(OwnerPick::Ambiguous(owners));
            };

            if let Some(owner) = graph.objects.get(&controller.uid) {
                return Ok(OwnerPick::Owner(owner.clone()));
            }

            let reference = controller.to_object_reference(&object.namespace);
            match client.fetch_by_reference(&reference).await {
                Ok(owner) => Ok(OwnerPick::Owner(owner)),
                Err(e) if limits.fetch_policy == FetchPolicy::BestEffort => {
                    tracing::warn!("Failed to fetch controller {} of {}: {}", reference, object, e);
                    Ok(OwnerPick::Ambiguous(owners))
                }
                Err(e) => Err(e),
            }
        }
    }
}
