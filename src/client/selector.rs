//! Label selector parsing for in-memory object sources
//!
//! Supports the equality-based subset of the Kubernetes selector syntax:
//! `key`, `!key`, `key=value`, `key==value` and `key!=value`, comma separated.
//! Terms become [`kube::core::Expression`]s, so matching follows kube's own
//! [`Selector`] semantics.

use kube::core::{Expression, Selector};

fn parse_term(term: &str) -> Option<Expression> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    if let Some((key, value)) = term.split_once("!=") {
        return Some(Expression::NotEqual(
            key.trim().to_string(),
            value.trim().to_string(),
        ));
    }
    if let Some((key, value)) = term.split_once("==").or_else(|| term.split_once('=')) {
        return Some(Expression::Equal(
            key.trim().to_string(),
            value.trim().to_string(),
        ));
    }
    if let Some(key) = term.strip_prefix('!') {
        return Some(Expression::DoesNotExist(key.trim().to_string()));
    }
    Some(Expression::Exists(term.to_string()))
}

/// Parse a comma separated selector string
///
/// An empty selector selects everything.
pub fn parse_selector(selector: &str) -> Selector {
    selector.split(',').filter_map(parse_term).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::SelectorExt;
    use std::collections::BTreeMap;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn selects(selector: &str, labels: &BTreeMap<String, String>) -> bool {
        parse_selector(selector).matches(labels)
    }

    #[test]
    fn test_empty_selector_matches_all() {
        assert!(selects("", &labels(&[])));
        assert!(selects("", &labels(&[("a", "b")])));
    }

    #[test]
    fn test_equality_terms() {
        let l = labels(&[("cluster.x-k8s.io/cluster-name", "prod"), ("tier", "web")]);
        assert!(selects("cluster.x-k8s.io/cluster-name=prod", &l));
        assert!(selects("cluster.x-k8s.io/cluster-name==prod,tier=web", &l));
        assert!(!selects("cluster.x-k8s.io/cluster-name=dev", &l));
        assert!(selects("tier!=db", &l));
        assert!(!selects("tier!=web", &l));
    }

    #[test]
    fn test_existence_terms() {
        let l = labels(&[("visualize", "")]);
        assert!(selects("visualize", &l));
        assert!(!selects("!visualize", &l));
        assert!(selects("!other", &l));
        assert!(!selects("other", &l));
    }

    #[test]
    fn test_terms_become_expressions() {
        let selector = parse_selector("app=web, !legacy");
        let expected: Selector = [
            Expression::Equal("app".to_string(), "web".to_string()),
            Expression::DoesNotExist("legacy".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(selector, expected);
    }
}
