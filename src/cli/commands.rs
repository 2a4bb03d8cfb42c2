//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;

use crate::client::{KubeClient, ManagementContext, ObjectClient, SnapshotClient};
use crate::config::{Config, ConfigLoader, get_config_value, paths};
use crate::management::build_management_cluster_tree;
use crate::resource::ObjectReference;
use crate::service::{ClusterOptions, build_cluster_resource_tree, get_custom_resource};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show the effective configuration, or a single value
    Show {
        /// Configuration key (e.g., "tree.maxGroupSize", "ownership.fetchPolicy")
        key: Option<String>,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
    Outline,
}

/// Object source: a live cluster, or a YAML snapshot when a path is given
pub async fn connect(snapshot: Option<&Path>) -> Result<Box<dyn ObjectClient>> {
    match snapshot {
        Some(path) => {
            let client = SnapshotClient::from_file(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            Ok(Box::new(client))
        }
        None => {
            tracing::debug!("Initializing Kubernetes client");
            let client = KubeClient::infer().await?;
            Ok(Box::new(client))
        }
    }
}

/// Print the resource tree of one cluster
pub async fn handle_tree_command(
    config: &Config,
    name: &str,
    namespace: &str,
    snapshot: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let client = connect(snapshot).await?;
    let options = ClusterOptions::new(namespace, name);
    let tree = build_cluster_resource_tree(&*client, &options, config).await?;

    if format == OutputFormat::Outline {
        print!("{}", tree.outline());
        return Ok(());
    }
    print_json(&tree, format)
}

/// Print the management cluster overview
pub async fn handle_clusters_command(
    snapshot: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let context = match snapshot {
        Some(path) => snapshot_context(path),
        None => KubeClient::current_context()?,
    };
    let client = connect(snapshot).await?;
    let tree = build_management_cluster_tree(&*client, &context).await?;
    print_json(&tree, format)
}

/// Print a single object
pub async fn handle_get_command(
    reference: &ObjectReference,
    snapshot: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let client = connect(snapshot).await?;
    let object = get_custom_resource(&*client, reference).await?;
    print_json(&object, format)
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, explicit_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Show { key } => {
            let config = ConfigLoader::load(explicit_path).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Path => {
            let config_path = explicit_path
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load(explicit_path).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let json = match format {
        OutputFormat::Compact => serde_json::to_string(value),
        _ => serde_json::to_string_pretty(value),
    }
    .context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Snapshots carry no kubeconfig; the management cluster is named after the file
fn snapshot_context(path: &Path) -> ManagementContext {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    ManagementContext {
        context: name.clone(),
        cluster: name,
        namespace: "default".to_string(),
    }
}
