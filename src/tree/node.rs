//! Display tree node
//!
//! This is the shape the dashboard consumes, serialized with camelCase field names.

use crate::resource::Severity;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A node in the rendered cluster resource tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Object name, empty for synthetic group nodes
    pub name: String,
    /// Object namespace, `default` when the object has none
    pub namespace: String,
    /// Label shown in the UI
    pub display_name: String,
    pub kind: String,
    pub group: String,
    pub version: String,
    /// Provider category (infrastructure, bootstrap, addons, virtual, ...)
    pub provider: String,
    pub uid: String,
    /// Real objects with children collapse through a tab
    pub collapse_with_tab: bool,
    /// Virtual objects collapse when clicked
    pub collapse_on_click: bool,
    pub collapsible: bool,
    /// Whether the node starts collapsed
    pub collapsed: bool,
    pub ready: bool,
    pub severity: Severity,
    /// Whether `ready` and `severity` come from a Ready condition
    pub has_ready: bool,
    pub children: Vec<ResourceNode>,
}

impl ResourceNode {
    /// Synthetic node aggregating other nodes
    ///
    /// Starts collapsed and ready; readiness is folded in with [`ResourceNode::absorb_readiness`].
    pub fn group(namespace: &str, kind: &str, provider: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            provider: provider.to_string(),
            collapse_on_click: true,
            collapsible: true,
            collapsed: true,
            ready: true,
            ..Default::default()
        }
    }

    /// Fold a child's readiness into this aggregate node
    ///
    /// Only children with a Ready condition count: the aggregate is ready when
    /// all of them are and carries their worst severity.
    pub fn absorb_readiness(&mut self, child: &ResourceNode) {
        if child.has_ready {
            self.has_ready = true;
            self.ready = self.ready && child.ready;
            self.severity = self.severity.worst(child.severity);
        }
    }

    /// Keys children are ordered by
    ///
    /// Virtual aggregates sort by display name only so they interleave with real
    /// kinds; everything else sorts by kind, then display name.
    pub fn sort_key(&self) -> (&str, &str) {
        if self.group == crate::resource::VIRTUAL_GROUP {
            (self.display_name.as_str(), "")
        } else {
            (self.kind.as_str(), self.display_name.as_str())
        }
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ResourceNode::node_count).sum::<usize>()
    }

    /// Render an indented text outline of the tree
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let status = match (self.has_ready, self.ready) {
            (false, _) => String::new(),
            (true, true) => " ready".to_string(),
            (true, false) if self.severity.as_str().is_empty() => " not-ready".to_string(),
            (true, false) => format!(" not-ready:{}", self.severity.as_str()),
        };
        let _ = writeln!(
            out,
            "{}{} {} [{}]{}{}",
            "  ".repeat(depth),
            self.kind,
            self.display_name,
            self.provider,
            status,
            if self.collapsed { " (collapsed)" } else { "" }
        );
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}
