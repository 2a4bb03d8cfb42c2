//! Sibling grouping
//!
//! Large sets of homogeneous siblings (a MachineSet with dozens of Machines) are
//! folded into bounded group nodes so the dashboard stays navigable, and the
//! add-on objects of a Cluster are gathered under one Add-ons node.

use super::node::ResourceNode;

pub const ADDONS_GROUP_KIND: &str = "AddonsGroup";
pub const ADDONS_PROVIDER: &str = "addons";
pub const CRS_GROUP_KIND: &str = "ClusterResourceSetGroup";
pub const CRS_GROUP_NAME: &str = "ClusterResourceSets";

/// Fold the children of `kind` into group nodes of at most `max_group_size`
///
/// Children of other kinds pass through in their original order, followed by
/// the group nodes. A single matching child is returned as is. When more than
/// one group is produced they are wrapped in an outer group labeled with the
/// total count.
pub fn group_similar_siblings(
    namespace: &str,
    kind: &str,
    provider: &str,
    children: Vec<ResourceNode>,
    max_group_size: usize,
) -> Vec<ResourceNode> {
    let (mut matching, mut result): (Vec<_>, Vec<_>) =
        children.into_iter().partition(|child| child.kind == kind);

    let total = matching.len();
    if total == 0 {
        return result;
    }
    if total == 1 {
        result.append(&mut matching);
        return result;
    }

    matching.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut groups: Vec<ResourceNode> = Vec::new();
    let mut batch: Vec<ResourceNode> = Vec::new();
    for child in matching {
        batch.push(child);
        if batch.len() >= max_group_size.max(1) {
            groups.push(kind_group(namespace, kind, provider, std::mem::take(&mut batch)));
        }
    }
    if !batch.is_empty() {
        groups.push(kind_group(namespace, kind, provider, batch));
    }

    if groups.len() > 1 {
        let mut parent = ResourceNode::group(namespace, kind, provider);
        parent.display_name = group_label(total, kind);
        let mut uids = Vec::with_capacity(total);
        for group in &groups {
            parent.absorb_readiness(group);
            parent.group.clone_from(&group.group);
            parent.version.clone_from(&group.version);
            uids.extend(group.children.iter().map(|c| c.uid.as_str()));
        }
        parent.uid = format!("{}: {}", kind, uids.join(" "));
        tracing::debug!("Grouped {} {} into {} groups", total, kind, groups.len());
        parent.children = groups;
        result.push(parent);
    } else {
        result.append(&mut groups);
    }

    result
}

fn kind_group(namespace: &str, kind: &str, provider: &str, children: Vec<ResourceNode>) -> ResourceNode {
    let mut group = ResourceNode::group(namespace, kind, provider);
    for child in &children {
        group.absorb_readiness(child);
        group.group.clone_from(&child.group);
        group.version.clone_from(&child.version);
    }
    group.display_name = group_label(children.len(), kind);
    group.uid = format!(
        "{}: {}",
        kind,
        children
            .iter()
            .map(|c| c.uid.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    );
    group.children = children;
    group
}

fn group_label(count: usize, kind: &str) -> String {
    if count == 1 {
        format!("1 {}", kind)
    } else {
        format!("{} {}", count, pluralize(kind))
    }
}

/// English plural of a kind name, e.g. `Machine` -> `Machines`, `Proxy` -> `Proxies`
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", word);
    }
    let mut chars = lower.chars().rev();
    if let (Some('y'), Some(prev)) = (chars.next(), chars.next()) {
        if !"aeiou".contains(prev) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{}s", word)
}

/// Gather children with the `addons` provider under a single Add-ons node
///
/// If the only add-on is the ClusterResourceSets aggregate, its children are
/// lifted into the Add-ons node directly. The node starts collapsed once it has
/// `collapse_threshold` children and is omitted when there are no add-ons. Like
/// other synthetic aggregates it belongs to no namespace.
pub fn partition_addons(
    children: Vec<ResourceNode>,
    collapse_threshold: usize,
) -> Vec<ResourceNode> {
    let (mut addons, mut result): (Vec<_>, Vec<_>) = children
        .into_iter()
        .partition(|child| child.provider == ADDONS_PROVIDER);

    if addons.is_empty() {
        return result;
    }

    if addons.len() == 1 && addons[0].kind == CRS_GROUP_KIND && addons[0].name == CRS_GROUP_NAME {
        addons = std::mem::take(&mut addons[0].children);
    }
    addons.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let node = ResourceNode {
        display_name: "Add-ons".to_string(),
        kind: ADDONS_GROUP_KIND.to_string(),
        provider: ADDONS_PROVIDER.to_string(),
        uid: "addons".to_string(),
        collapse_on_click: true,
        collapsible: true,
        collapsed: addons.len() >= collapse_threshold,
        ready: true,
        children: addons,
        ..Default::default()
    };
    if !node.children.is_empty() {
        result.push(node);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Machine"), "Machines");
        assert_eq!(pluralize("MachineSet"), "MachineSets");
        assert_eq!(pluralize("ClusterClass"), "ClusterClasses");
        assert_eq!(pluralize("MachineHealthCheck"), "MachineHealthChecks");
        assert_eq!(pluralize("Proxy"), "Proxies");
        assert_eq!(pluralize("Gateway"), "Gateways");
        assert_eq!(pluralize("Box"), "Boxes");
    }

    #[test]
    fn test_group_label() {
        assert_eq!(group_label(1, "Machine"), "1 Machine");
        assert_eq!(group_label(10, "Machine"), "10 Machines");
    }
}
