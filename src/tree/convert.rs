//! Raw object tree to display tree conversion

use super::grouping::{group_similar_siblings, partition_addons};
use super::node::ResourceNode;
use super::options::TreeOptions;
use super::provider::resolve_provider;
use crate::resource::{ObjectTree, Resource};

/// Convert the whole object tree, starting at its root
pub fn convert_tree(tree: &ObjectTree, options: &TreeOptions) -> ResourceNode {
    convert(tree, tree.root(), options)
}

/// Convert `object` and everything below it into display nodes
///
/// Children are ordered by [`ResourceNode::sort_key`] with a stable sort, so the
/// same input always yields the same output.
pub fn convert(tree: &ObjectTree, object: &Resource, options: &TreeOptions) -> ResourceNode {
    let namespace = if object.namespace.is_empty() {
        "default".to_string()
    } else {
        object.namespace.clone()
    };

    let raw_children = tree.get_objects_by_parent(&object.uid);
    let mut node = ResourceNode {
        name: object.name.clone(),
        namespace,
        display_name: object.display_name(),
        kind: object.kind.clone(),
        group: object.group().to_string(),
        version: object.version().to_string(),
        provider: resolve_provider(object, &raw_children, options),
        uid: object.uid.clone(),
        collapsed: options.kinds_to_collapse.contains(&object.kind),
        ..Default::default()
    };

    if let Some(ready) = object.ready_condition() {
        node.has_ready = true;
        node.ready = ready.status;
        node.severity = ready.severity;
    }

    let mut children: Vec<ResourceNode> = raw_children
        .iter()
        .map(|child| convert(tree, child, options))
        .collect();

    if options.group_similar_siblings {
        children = group_similar_siblings(
            &node.namespace,
            &options.grouping_kind,
            &options.grouping_provider,
            children,
            options.max_group_size,
        );
    }

    if object.kind == "Cluster" {
        children = partition_addons(children, options.addons_collapse_threshold);
    }

    node.collapse_on_click = object.is_virtual();
    node.collapse_with_tab = !children.is_empty() && !node.collapse_on_click;
    node.collapsible = node.collapse_with_tab || node.collapse_on_click;

    children.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    node.children = children;

    tracing::trace!(
        "Converted {} with {} children",
        object,
        node.children.len()
    );
    node
}
