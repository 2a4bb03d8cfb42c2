//! Cluster API resource tree engine
//!
//! Discovers the objects that make up a workload cluster, resolves their
//! ownership and renders them as a display-ready tree for a dashboard.
//! It can be used both as a binary and as a library for testing.

pub mod cli;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod management;
pub mod ownership;
pub mod resource;
pub mod service;
pub mod tree;

// Re-export commonly used types for convenience
pub use client::{ObjectClient, SnapshotClient};
pub use error::{Error, Result};
pub use resource::{ObjectTree, Resource};
pub use service::{ClusterOptions, build_cluster_resource_tree};
pub use tree::{ResourceNode, TreeOptions};
