//!
//! # List filters
//!
//! Independent predicates over a cluster, combined with AND.
//! Every predicate passes when it is given no values.
//!
use std::collections::BTreeMap;

use clusterd_metadata::cluster::Cluster;

pub type ClusterPredicate<'a> = &'a dyn Fn(&Cluster) -> bool;

/// keep the candidates accepted by every predicate
pub fn filter_clusters(candidates: Vec<Cluster>, filters: &[ClusterPredicate<'_>]) -> Vec<Cluster> {
    candidates
        .into_iter()
        .filter(|cluster| filters.iter().all(|filter| filter(cluster)))
        .collect()
}

/// `matched` equals any candidate
pub fn filter_contains(matched: &str, candidates: &[String]) -> bool {
    candidates.is_empty() || candidates.iter().any(|candidate| candidate == matched)
}

/// `matched` starts with any candidate
pub fn filter_contains_prefix(matched: &str, candidates: &[String]) -> bool {
    candidates.is_empty()
        || candidates
            .iter()
            .any(|candidate| matched.starts_with(candidate.as_str()))
}

/// any candidate label is present, with the same value unless the candidate value is empty
pub fn filter_match_labels(
    matched: &BTreeMap<String, String>,
    candidates: &BTreeMap<String, String>,
) -> bool {
    candidates.is_empty()
        || candidates.iter().any(|(key, value)| {
            matched
                .get(key)
                .is_some_and(|actual| value.is_empty() || value == actual)
        })
}
