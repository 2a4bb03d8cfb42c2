//! Provider classification
//!
//! A provider tells the dashboard which Cluster API subsystem an object belongs
//! to. It comes from a CRD label override, the object's API group, or for
//! virtual aggregates, the agreed provider of their children.

use super::options::TreeOptions;
use crate::resource::{CAPI_GROUP_MARKER, Resource};

pub const VIRTUAL_PROVIDER: &str = "virtual";

/// Provider implied by the object itself, without looking at children
///
/// `infrastructure.cluster.x-k8s.io` gives `infrastructure`; groups outside the
/// Cluster API domain and virtual objects give `virtual`.
pub fn lookup_provider(object: &Resource) -> String {
    let group = object.group();
    if !group.contains(CAPI_GROUP_MARKER) || object.is_virtual() {
        return VIRTUAL_PROVIDER.to_string();
    }
    group.split('.').next().unwrap_or(group).to_string()
}

/// Resolve the provider of `object` given its raw children
pub fn resolve_provider(object: &Resource, children: &[&Resource], options: &TreeOptions) -> String {
    if let Some(provider) = options.provider_overrides.get(&object.kind) {
        return provider.to_string();
    }

    if !object.is_virtual() {
        return lookup_provider(object);
    }

    if !options.kinds_inheriting_child_provider.contains(&object.kind) {
        return VIRTUAL_PROVIDER.to_string();
    }

    let mut agreed: Option<String> = None;
    for child in children {
        let provider = lookup_provider(child);
        if provider == VIRTUAL_PROVIDER {
            return VIRTUAL_PROVIDER.to_string();
        }
        match &agreed {
            Some(existing) if *existing != provider => {
                tracing::debug!(
                    "Children of {} disagree on provider ({} vs {})",
                    object,
                    existing,
                    provider
                );
                return VIRTUAL_PROVIDER.to_string();
            }
            Some(_) => {}
            None => agreed = Some(provider),
        }
    }

    agreed.unwrap_or_else(|| VIRTUAL_PROVIDER.to_string())
}
