//! Sibling grouping and add-ons partition tests

use capiviz::resource::Severity;
use capiviz::tree::ResourceNode;
use capiviz::tree::grouping::{
    ADDONS_GROUP_KIND, CRS_GROUP_KIND, CRS_GROUP_NAME, group_similar_siblings, partition_addons,
};

fn node(kind: &str, name: &str, provider: &str) -> ResourceNode {
    ResourceNode {
        name: name.to_string(),
        namespace: "default".to_string(),
        display_name: name.to_string(),
        kind: kind.to_string(),
        group: "cluster.x-k8s.io".to_string(),
        version: "v1beta1".to_string(),
        provider: provider.to_string(),
        uid: format!("uid-{}", name),
        ready: true,
        has_ready: true,
        ..Default::default()
    }
}

fn machines(count: usize) -> Vec<ResourceNode> {
    (0..count)
        .map(|i| node("Machine", &format!("m-{:02}", i), "cluster"))
        .collect()
}

fn leaf_count(nodes: &[ResourceNode]) -> usize {
    nodes
        .iter()
        .map(|n| {
            if n.children.is_empty() {
                1
            } else {
                leaf_count(&n.children)
            }
        })
        .sum()
}

#[test]
fn test_twenty_three_machines() {
    let grouped = group_similar_siblings("default", "Machine", "cluster", machines(23), 10);

    assert_eq!(grouped.len(), 1);
    let parent = &grouped[0];
    assert_eq!(parent.display_name, "23 Machines");
    assert_eq!(parent.kind, "Machine");
    assert!(parent.collapsed);
    assert!(parent.collapse_on_click);

    let sizes: Vec<usize> = parent.children.iter().map(|g| g.children.len()).collect();
    assert_eq!(sizes, vec![10, 10, 3]);
    let labels: Vec<&str> = parent
        .children
        .iter()
        .map(|g| g.display_name.as_str())
        .collect();
    assert_eq!(labels, vec!["10 Machines", "10 Machines", "3 Machines"]);
    assert!(parent.uid.starts_with("Machine: uid-m-00 uid-m-01"));
}

#[test]
fn test_grouping_conserves_children() {
    for count in [2, 5, 9, 10, 11, 20, 21, 37] {
        for max in [1, 3, 10] {
            let grouped = group_similar_siblings("default", "Machine", "cluster", machines(count), max);
            assert_eq!(leaf_count(&grouped), count, "count={} max={}", count, max);

            let groups = if grouped.len() == 1 && grouped[0].children.iter().all(|c| !c.children.is_empty()) {
                &grouped[0].children
            } else {
                &grouped
            };
            for group in groups {
                assert!(group.children.len() <= max, "count={} max={}", count, max);
            }
        }
    }
}

#[test]
fn test_singleton_passes_through() {
    let children = vec![node("Machine", "only", "cluster"), node("DockerMachine", "dm", "infrastructure")];
    let grouped = group_similar_siblings("default", "Machine", "cluster", children, 10);

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].kind, "DockerMachine");
    assert_eq!(grouped[1].display_name, "only");
    assert!(grouped[1].children.is_empty());
}

#[test]
fn test_exactly_max_has_no_outer_group() {
    let grouped = group_similar_siblings("default", "Machine", "cluster", machines(10), 10);

    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].display_name, "10 Machines");
    assert_eq!(grouped[0].children.len(), 10);
    assert!(grouped[0].children.iter().all(|c| c.children.is_empty()));
}

#[test]
fn test_remainder_of_one_uses_singular_label() {
    let grouped = group_similar_siblings("default", "Machine", "cluster", machines(11), 10);

    let parent = &grouped[0];
    assert_eq!(parent.display_name, "11 Machines");
    assert_eq!(parent.children[1].display_name, "1 Machine");
}

#[test]
fn test_other_kinds_keep_order() {
    let mut children = vec![
        node("MachineHealthCheck", "zeta", "cluster"),
        node("DockerMachineTemplate", "alpha", "infrastructure"),
    ];
    children.extend(machines(3));
    let grouped = group_similar_siblings("default", "Machine", "cluster", children, 10);

    let names: Vec<&str> = grouped.iter().map(|n| n.display_name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "3 Machines"]);
}

#[test]
fn test_group_reflects_worst_child() {
    let mut children = machines(3);
    children[1].ready = false;
    children[1].severity = Severity::Warning;
    children[2].ready = false;
    children[2].severity = Severity::Error;
    let grouped = group_similar_siblings("default", "Machine", "cluster", children, 10);

    let group = &grouped[0];
    assert!(group.has_ready);
    assert!(!group.ready);
    assert_eq!(group.severity, Severity::Error);
}

fn crs_group(count: usize) -> ResourceNode {
    let mut group = node(CRS_GROUP_KIND, CRS_GROUP_NAME, "addons");
    group.display_name = CRS_GROUP_NAME.to_string();
    group.children = (0..count)
        .map(|i| node("ClusterResourceSet", &format!("crs-{}", i), "addons"))
        .collect();
    group
}

#[test]
fn test_addons_collapse_threshold() {
    let addons = |count: usize| -> Vec<ResourceNode> {
        let mut children: Vec<ResourceNode> = (0..count)
            .map(|i| node("HelmChartProxy", &format!("chart-{}", i), "addons"))
            .collect();
        children.push(node("DockerCluster", "prod", "infrastructure"));
        children
    };

    let many = partition_addons(addons(5), 4);
    let group = many.iter().find(|n| n.kind == ADDONS_GROUP_KIND).unwrap();
    assert_eq!(group.children.len(), 5);
    assert!(group.collapsed);
    assert_eq!(group.uid, "addons");
    assert_eq!(group.display_name, "Add-ons");
    assert_eq!(group.namespace, "");

    let few = partition_addons(addons(3), 4);
    let group = few.iter().find(|n| n.kind == ADDONS_GROUP_KIND).unwrap();
    assert_eq!(group.children.len(), 3);
    assert!(!group.collapsed);
    assert_eq!(few.len(), 2);
}

#[test]
fn test_addons_omitted_when_empty() {
    let children = vec![node("DockerCluster", "prod", "infrastructure")];
    let result = partition_addons(children.clone(), 4);
    assert_eq!(result, children);
}

#[test]
fn test_lone_crs_group_is_flattened() {
    let result = partition_addons(vec![crs_group(2)], 4);

    assert_eq!(result.len(), 1);
    let names: Vec<&str> = result[0].children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["crs-0", "crs-1"]);
}

#[test]
fn test_crs_group_kept_next_to_other_addons() {
    let children = vec![node("HelmChartProxy", "cni", "addons"), crs_group(2)];
    let result = partition_addons(children, 4);

    let kinds: Vec<&str> = result[0].children.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds, vec![CRS_GROUP_KIND, "HelmChartProxy"]);
}
