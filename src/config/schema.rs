//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use crate::discovery::DiscoveryOptions;
use crate::ownership::{FetchPolicy, WalkLimits};
use crate::resource::CLUSTER_NAME_LABEL;
use crate::tree::inject::{DEFAULT_PROVIDER_TYPE_LABEL, DEFAULT_VISUALIZE_LABEL, InjectOptions};
use crate::tree::TreeOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Display tree shaping
    #[serde(default)]
    pub tree: TreeConfig,

    /// Owner reference resolution
    #[serde(default)]
    pub ownership: OwnershipConfig,

    /// Label keys read from CRDs and objects
    #[serde(default)]
    pub labels: LabelsConfig,

    /// Cluster discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tree configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Fold large sets of siblings into group nodes
    #[serde(default = "default_true")]
    pub group_similar_siblings: bool,

    /// Kind whose siblings are grouped
    #[serde(default = "default_grouping_kind")]
    pub grouping_kind: String,

    /// Provider shown on group nodes
    #[serde(default = "default_grouping_provider")]
    pub grouping_provider: String,

    /// Maximum children per group node
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,

    /// Add-ons node starts collapsed at this many children
    #[serde(default = "default_addons_collapse_threshold")]
    pub addons_collapse_threshold: usize,

    #[serde(default = "default_kinds_to_collapse")]
    pub kinds_to_collapse: BTreeSet<String>,

    #[serde(default = "default_kinds_inheriting_child_provider")]
    pub kinds_inheriting_child_provider: BTreeSet<String>,
}

/// Ownership configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipConfig {
    /// What to do when an owner cannot be fetched
    #[serde(default)]
    pub fetch_policy: FetchPolicy,

    /// Maximum owner hops followed from an object
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Reuse fetched objects for the duration of one request
    #[serde(default = "default_true")]
    pub memoize_fetches: bool,
}

/// Label keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelsConfig {
    /// Marks CRDs whose instances are added to the tree
    #[serde(default = "default_visualize_label")]
    pub visualize_resource: String,

    /// Forces the provider of a CRD's kind
    #[serde(default = "default_provider_type_label")]
    pub provider_type: String,

    /// Names the Cluster an object belongs to
    #[serde(default = "default_cluster_name_label")]
    pub cluster_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Show ClusterResourceSets bound to the cluster
    #[serde(default = "default_true")]
    pub show_cluster_resource_sets: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Write logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_grouping_kind() -> String {
    "Machine".to_string()
}

fn default_grouping_provider() -> String {
    "cluster".to_string()
}

fn default_max_group_size() -> usize {
    10
}

fn default_addons_collapse_threshold() -> usize {
    4
}

fn default_kinds_to_collapse() -> BTreeSet<String> {
    TreeOptions::default().kinds_to_collapse
}

fn default_kinds_inheriting_child_provider() -> BTreeSet<String> {
    TreeOptions::default().kinds_inheriting_child_provider
}

fn default_max_depth() -> usize {
    32
}

fn default_visualize_label() -> String {
    DEFAULT_VISUALIZE_LABEL.to_string()
}

fn default_provider_type_label() -> String {
    DEFAULT_PROVIDER_TYPE_LABEL.to_string()
}

fn default_cluster_name_label() -> String {
    CLUSTER_NAME_LABEL.to_string()
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            group_similar_siblings: default_true(),
            grouping_kind: default_grouping_kind(),
            grouping_provider: default_grouping_provider(),
            max_group_size: default_max_group_size(),
            addons_collapse_threshold: default_addons_collapse_threshold(),
            kinds_to_collapse: default_kinds_to_collapse(),
            kinds_inheriting_child_provider: default_kinds_inheriting_child_provider(),
        }
    }
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            fetch_policy: FetchPolicy::default(),
            max_depth: default_max_depth(),
            memoize_fetches: default_true(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            visualize_resource: default_visualize_label(),
            provider_type: default_provider_type_label(),
            cluster_name: default_cluster_name_label(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            show_cluster_resource_sets: default_true(),
        }
    }
}

impl Config {
    /// Tree options for one request, without provider overrides
    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            group_similar_siblings: self.tree.group_similar_siblings,
            grouping_kind: self.tree.grouping_kind.clone(),
            grouping_provider: self.tree.grouping_provider.clone(),
            max_group_size: self.tree.max_group_size,
            addons_collapse_threshold: self.tree.addons_collapse_threshold,
            kinds_to_collapse: self.tree.kinds_to_collapse.clone(),
            kinds_inheriting_child_provider: self.tree.kinds_inheriting_child_provider.clone(),
            provider_overrides: Default::default(),
        }
    }

    pub fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            fetch_policy: self.ownership.fetch_policy,
            max_depth: self.ownership.max_depth,
        }
    }

    pub fn inject_options(&self) -> InjectOptions {
        InjectOptions {
            visualize_label: self.labels.visualize_resource.clone(),
            provider_type_label: self.labels.provider_type.clone(),
            cluster_name_label: self.labels.cluster_name.clone(),
            limits: self.walk_limits(),
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            show_cluster_resource_sets: self.discovery.show_cluster_resource_sets,
            cluster_name_label: self.labels.cluster_name.clone(),
        }
    }
}
