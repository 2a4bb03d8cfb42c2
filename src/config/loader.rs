//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::Config};
use crate::ownership::FetchPolicy;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Config file (`explicit_path`, or the root config file if present)
    /// 3. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Config> {
        let mut config = Self::load_defaults();

        match explicit_path {
            Some(path) => {
                config = Self::load_file(path)?;
            }
            None => {
                let root = paths::root_config_path();
                if root.exists() {
                    config = Self::load_file(&root)?;
                }
            }
        }

        config = Self::apply_env_overrides(config)?;
        Self::validate(&config)?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// Missing keys fall back to their defaults.
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values that parse but cannot be used
    pub fn validate(config: &Config) -> Result<()> {
        if config.tree.max_group_size == 0 {
            return Err(anyhow::anyhow!("tree.maxGroupSize must be at least 1"));
        }
        if config.ownership.max_depth == 0 {
            return Err(anyhow::anyhow!("ownership.maxDepth must be at least 1"));
        }
        if config.tree.grouping_kind.is_empty() {
            return Err(anyhow::anyhow!("tree.groupingKind must not be empty"));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Result<Config> {
        // CAPIVIZ_MAX_GROUP_SIZE override
        if let Ok(size) = std::env::var("CAPIVIZ_MAX_GROUP_SIZE") {
            config.tree.max_group_size = size
                .parse()
                .context("CAPIVIZ_MAX_GROUP_SIZE must be a number")?;
        }

        // CAPIVIZ_FETCH_POLICY override
        if let Ok(policy) = std::env::var("CAPIVIZ_FETCH_POLICY") {
            config.ownership.fetch_policy = match policy.as_str() {
                "bestEffort" => FetchPolicy::BestEffort,
                "strict" => FetchPolicy::Strict,
                other => {
                    return Err(anyhow::anyhow!(
                        "CAPIVIZ_FETCH_POLICY must be 'bestEffort' or 'strict', got '{}'",
                        other
                    ));
                }
            };
        }

        // CAPIVIZ_GROUP_SIMILAR_SIBLINGS override
        if let Ok(group) = std::env::var("CAPIVIZ_GROUP_SIMILAR_SIBLINGS") {
            config.tree.group_similar_siblings = group
                .parse()
                .context("CAPIVIZ_GROUP_SIMILAR_SIBLINGS must be 'true' or 'false'")?;
        }

        Ok(config)
    }
}
