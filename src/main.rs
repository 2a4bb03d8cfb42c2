//! capiviz - render Cluster API workload clusters as display-ready resource trees
//!
//! Prints the JSON tree a dashboard consumes, from a live management cluster or
//! an offline YAML snapshot.

use anyhow::Result;
use capiviz::cli::{
    ConfigSubcommand, OutputFormat, handle_clusters_command, handle_config_command,
    handle_get_command, handle_tree_command, init_logging,
};
use capiviz::config::ConfigLoader;
use capiviz::resource::ObjectReference;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Render Cluster API workload clusters as resource trees
#[derive(Parser, Debug)]
#[command(name = "capiviz", version)]
#[command(about = "Render Cluster API workload clusters as resource trees", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration file (defaults to <config dir>/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resource tree of a workload cluster
    Tree {
        /// Cluster name
        name: String,
        /// Cluster namespace
        #[arg(long, short = 'n', default_value = "default")]
        namespace: String,
        /// Read objects from a YAML snapshot instead of a live cluster
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Print JSON on a single line
        #[arg(long, conflicts_with = "outline")]
        compact: bool,
        /// Print an indented text outline instead of JSON
        #[arg(long)]
        outline: bool,
    },
    /// Print the workload clusters of the management cluster
    Clusters {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        compact: bool,
    },
    /// Print a single object
    Get {
        /// Object kind, e.g. DockerMachine
        kind: String,
        name: String,
        /// Object API version, e.g. infrastructure.cluster.x-k8s.io/v1beta1
        #[arg(long)]
        api_version: String,
        #[arg(long, short = 'n', default_value = "default")]
        namespace: String,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        compact: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn format(compact: bool) -> OutputFormat {
    if compact {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Config { subcommand } = args.command {
        return handle_config_command(subcommand, args.config.as_deref());
    }

    let config = ConfigLoader::load(args.config.as_deref())?;
    init_logging(args.debug, config.logging.file.as_deref())?;
    tracing::debug!("Configuration loaded");

    match args.command {
        Command::Tree {
            name,
            namespace,
            snapshot,
            compact,
            outline,
        } => {
            let format = if outline {
                OutputFormat::Outline
            } else {
                format(compact)
            };
            handle_tree_command(&config, &name, &namespace, snapshot.as_deref(), format).await
        }
        Command::Clusters { snapshot, compact } => {
            handle_clusters_command(snapshot.as_deref(), format(compact)).await
        }
        Command::Get {
            kind,
            name,
            api_version,
            namespace,
            snapshot,
            compact,
        } => {
            let reference = ObjectReference::new(api_version, kind, namespace, name);
            handle_get_command(&reference, snapshot.as_deref(), format(compact)).await
        }
        Command::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = run(args).await {
        match err.downcast_ref::<capiviz::Error>() {
            Some(e) => eprintln!("Error ({}): {:#}", e.status_code(), err),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}
