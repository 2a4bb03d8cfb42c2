//! Configuration system for capiviz
//!
//! A single YAML file with per-field defaults, overridable through environment
//! variables. Tree building reads it through [`Config::tree_options`] and friends.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, DiscoveryConfig, LabelsConfig, LoggingConfig, OwnershipConfig, TreeConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "tree.groupSimilarSiblings" => Ok(config.tree.group_similar_siblings.to_string()),
        "tree.groupingKind" => Ok(config.tree.grouping_kind.clone()),
        "tree.groupingProvider" => Ok(config.tree.grouping_provider.clone()),
        "tree.maxGroupSize" => Ok(config.tree.max_group_size.to_string()),
        "tree.addonsCollapseThreshold" => Ok(config.tree.addons_collapse_threshold.to_string()),
        "tree.kindsToCollapse" => Ok(join(&config.tree.kinds_to_collapse)),
        "tree.kindsInheritingChildProvider" => {
            Ok(join(&config.tree.kinds_inheriting_child_provider))
        }
        "ownership.fetchPolicy" => serde_yaml::to_string(&config.ownership.fetch_policy)
            .map(|s| s.trim().to_string())
            .map_err(|e| anyhow::anyhow!("Failed to serialize fetchPolicy: {}", e)),
        "ownership.maxDepth" => Ok(config.ownership.max_depth.to_string()),
        "ownership.memoizeFetches" => Ok(config.ownership.memoize_fetches.to_string()),
        "labels.visualizeResource" => Ok(config.labels.visualize_resource.clone()),
        "labels.providerType" => Ok(config.labels.provider_type.clone()),
        "labels.clusterName" => Ok(config.labels.cluster_name.clone()),
        "discovery.showClusterResourceSets" => {
            Ok(config.discovery.show_cluster_resource_sets.to_string())
        }
        "logging.file" => Ok(config
            .logging
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_value() {
        let config = Config::default();
        assert_eq!(get_config_value(&config, "tree.maxGroupSize").unwrap(), "10");
        assert_eq!(
            get_config_value(&config, "tree.kindsToCollapse").unwrap(),
            "ClusterResourceSetGroup,Machine,TemplateGroup"
        );
        assert_eq!(
            get_config_value(&config, "ownership.fetchPolicy").unwrap(),
            "bestEffort"
        );
        assert!(get_config_value(&config, "ui.skin").is_err());
    }
}
