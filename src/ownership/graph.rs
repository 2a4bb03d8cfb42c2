//! Ownership graph construction and transitive reduction
//!
//! Nodes are objects keyed by UID; an edge `I -> J` means "I is owned by J".

use crate::client::ObjectClient;
use crate::error::Result;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// What to do when an owner cannot be fetched while walking owner references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchPolicy {
    /// Skip the owner and keep walking; the graph may be incomplete
    #[default]
    BestEffort,
    /// Abort graph construction with the fetch error
    Strict,
}

/// Limits applied while walking owner references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    pub fetch_policy: FetchPolicy,
    /// Maximum number of owner hops followed from the start object
    pub max_depth: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            fetch_policy: FetchPolicy::BestEffort,
            max_depth: 32,
        }
    }
}

/// A graph of objects and their owners
#[derive(Debug, Clone, Default)]
pub struct OwnershipGraph {
    /// Every object visited, indexed by UID
    pub objects: HashMap<String, Resource>,
    /// For each UID, the UIDs of the objects that own it
    pub owner_edges: HashMap<String, BTreeSet<String>>,
}

impl OwnershipGraph {
    /// Owners of `uid`, empty if none were recorded
    pub fn owners_of(&self, uid: &str) -> impl Iterator<Item = &String> {
        self.owner_edges.get(uid).into_iter().flatten()
    }

    /// Record that `owned` is owned by `owner`
    pub fn add_edge(&mut self, owned: &str, owner: &str) {
        self.owner_edges
            .entry(owned.to_string())
            .or_default()
            .insert(owner.to_string());
    }

    /// Build the graph by following owner references upward from `object`
    ///
    /// Each owner is fetched through `client` and walked in turn. Objects are
    /// visited once, so malformed cyclic ownership terminates.
    pub async fn build<C: ObjectClient + ?Sized>(
        client: &C,
        object: &Resource,
        limits: WalkLimits,
    ) -> Result<Self> {
        let mut graph = Self::default();
        graph.objects.insert(object.uid.clone(), object.clone());

        let mut pending: Vec<(Resource, usize)> = vec![(object.clone(), 0)];
        while let Some((current, depth)) = pending.pop() {
            if depth >= limits.max_depth {
                tracing::warn!(
                    "Stopping owner walk at {} after {} hops",
                    current,
                    limits.max_depth
                );
                continue;
            }

            for owner_ref in &current.owner_references {
                let reference = owner_ref.to_object_reference(&current.namespace);
                let owner = match client.fetch_by_reference(&reference).await {
                    Ok(owner) => owner,
                    Err(e) if limits.fetch_policy == FetchPolicy::BestEffort => {
                        tracing::warn!("Failed to fetch owner {} of {}: {}", reference, current, e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                graph.add_edge(&current.uid, &owner.uid);
                if !graph.objects.contains_key(&owner.uid) {
                    graph.objects.insert(owner.uid.clone(), owner.clone());
                    pending.push((owner, depth + 1));
                }
            }
        }

        Ok(graph)
    }

    /// Remove owners of `start` that are reachable through another owner
    ///
    /// If I is owned by J and K, and J is owned by K, K is dropped from I's
    /// owners since I is already owned by K through J. Only the nearest owners
    /// remain. Reducing twice gives the same result.
    pub fn remove_transitive_owners(&mut self, start: &str) {
        let direct: Vec<String> = self.owners_of(start).cloned().collect();
        if direct.len() < 2 {
            return;
        }

        // owners reachable from each direct owner, never counting that owner itself
        let reach: BTreeMap<&str, HashSet<String>> = direct
            .iter()
            .map(|owner| (owner.as_str(), self.ancestors(owner, start)))
            .collect();

        // mutual reachability (an owner cycle) keeps both sides
        let implied: HashSet<&str> = direct
            .iter()
            .filter(|k| {
                reach.iter().any(|(j, ancestors)| {
                    *j != k.as_str()
                        && ancestors.contains(k.as_str())
                        && !reach[k.as_str()].contains(*j)
                })
            })
            .map(String::as_str)
            .collect();
        if implied.is_empty() {
            return;
        }

        let implied: HashSet<String> = implied.into_iter().map(str::to_string).collect();
        if let Some(owners) = self.owner_edges.get_mut(start) {
            owners.retain(|uid| !implied.contains(uid));
        }
    }

    /// Every owner above `uid`, excluding `uid` and `start`
    fn ancestors(&self, uid: &str, start: &str) -> HashSet<String> {
        let mut visited: HashSet<String> = HashSet::from([uid.to_string(), start.to_string()]);
        let mut found = HashSet::new();
        let mut stack: Vec<String> = self.owners_of(uid).cloned().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            stack.extend(self.owners_of(&current).cloned());
            found.insert(current);
        }
        found
    }
}
