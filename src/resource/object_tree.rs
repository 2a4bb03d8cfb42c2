//! Raw discovered object tree
//!
//! The owner-based tree produced by cluster discovery, before it is converted into
//! display nodes. Children keep insertion order so conversion is deterministic.

use super::Resource;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ObjectTree {
    root: Resource,
    objects: HashMap<String, Resource>,
    children: HashMap<String, Vec<String>>,
}

impl ObjectTree {
    pub fn new(root: Resource) -> Self {
        Self {
            root,
            objects: HashMap::new(),
            children: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Resource {
        &self.root
    }

    /// Look up an object by UID, including the root
    pub fn get_object(&self, uid: &str) -> Option<&Resource> {
        if self.root.uid == uid {
            return Some(&self.root);
        }
        self.objects.get(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.get_object(uid).is_some()
    }

    /// Children of `uid` in insertion order
    pub fn get_objects_by_parent(&self, uid: &str) -> Vec<&Resource> {
        self.children
            .get(uid)
            .map(|uids| uids.iter().filter_map(|u| self.objects.get(u)).collect())
            .unwrap_or_default()
    }

    /// Attach `child` under `parent`
    ///
    /// Returns false when the parent is not part of the tree or the child is
    /// already present.
    pub fn add(&mut self, parent: &Resource, child: Resource) -> bool {
        if !self.contains(&parent.uid) || self.contains(&child.uid) {
            return false;
        }

        tracing::debug!("Adding {} under {}", child, parent);
        self.children
            .entry(parent.uid.clone())
            .or_default()
            .push(child.uid.clone());
        self.objects.insert(child.uid.clone(), child);
        true
    }

    /// Number of objects, root included
    pub fn object_count(&self) -> usize {
        self.objects.len() + 1
    }
}
