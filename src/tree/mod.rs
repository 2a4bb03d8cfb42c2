//! Display tree construction
//!
//! Turns the raw discovered [`ObjectTree`](crate::resource::ObjectTree) into the
//! [`ResourceNode`] tree the dashboard renders: provider classification,
//! readiness, collapse flags, sibling grouping and stable ordering.

pub mod convert;
pub mod grouping;
pub mod inject;
pub mod node;
pub mod options;
pub mod provider;

pub use convert::{convert, convert_tree};
pub use grouping::{group_similar_siblings, partition_addons, pluralize};
pub use inject::{InjectOptions, ensure_connected, inject_custom_resources};
pub use node::ResourceNode;
pub use options::{ProviderType, TreeOptions};
pub use provider::{lookup_provider, resolve_provider};
