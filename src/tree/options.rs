//! Per-request tree building options

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Provider category that a CRD label may force onto a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Cluster,
    Bootstrap,
    #[serde(rename = "controlplane")]
    ControlPlane,
    Infrastructure,
    Addons,
    Virtual,
}

impl ProviderType {
    pub const ALL: [ProviderType; 6] = [
        ProviderType::Cluster,
        ProviderType::Bootstrap,
        ProviderType::ControlPlane,
        ProviderType::Infrastructure,
        ProviderType::Addons,
        ProviderType::Virtual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Cluster => "cluster",
            ProviderType::Bootstrap => "bootstrap",
            ProviderType::ControlPlane => "controlplane",
            ProviderType::Infrastructure => "infrastructure",
            ProviderType::Addons => "addons",
            ProviderType::Virtual => "virtual",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "invalid provider type {:?}, expected one of cluster, bootstrap, controlplane, infrastructure, addons, virtual",
                    s
                ))
            })
    }
}

/// Options threaded through one tree conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Batch siblings of `grouping_kind` into bounded group nodes
    pub group_similar_siblings: bool,
    pub grouping_kind: String,
    /// Provider assigned to the synthetic group nodes
    pub grouping_provider: String,
    pub max_group_size: usize,
    /// The Add-ons node starts collapsed once it has this many children
    pub addons_collapse_threshold: usize,
    /// Kinds whose nodes start collapsed
    pub kinds_to_collapse: BTreeSet<String>,
    /// Virtual kinds that take their provider from their children
    pub kinds_inheriting_child_provider: BTreeSet<String>,
    /// Kind to provider overrides collected from CRD labels
    pub provider_overrides: BTreeMap<String, ProviderType>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            group_similar_siblings: true,
            grouping_kind: "Machine".to_string(),
            grouping_provider: "cluster".to_string(),
            max_group_size: 10,
            addons_collapse_threshold: 4,
            kinds_to_collapse: ["TemplateGroup", "ClusterResourceSetGroup", "Machine"]
                .into_iter()
                .map(String::from)
                .collect(),
            kinds_inheriting_child_provider: ["ClusterResourceSetGroup"]
                .into_iter()
                .map(String::from)
                .collect(),
            provider_overrides: BTreeMap::new(),
        }
    }
}

impl TreeOptions {
    pub fn with_overrides(mut self, overrides: BTreeMap<String, ProviderType>) -> Self {
        self.provider_overrides = overrides;
        self
    }
}
