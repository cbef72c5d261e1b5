//!
//! # Control api messages
//!
//! Responses can only be built from stored clusters by running them through
//! redaction, so nothing unredacted leaves the api.
//!
use std::collections::BTreeMap;

use serde::Serialize;

use clusterd_metadata::cluster::{Cluster, ClusterSpec};
use clusterd_metadata::core::Version;
use clusterd_types::{ClusterId, LabelKey, LabelValue, Name};

use crate::services::redact::{redact_cluster, redact_clusters};

#[derive(Debug, Default, Clone)]
pub struct GetClusterRequest {
    pub cluster_id: ClusterId,
}

impl GetClusterRequest {
    pub fn new(cluster_id: impl Into<ClusterId>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetClusterResponse {
    cluster: Cluster,
}

impl GetClusterResponse {
    pub(crate) fn redacted(cluster: &Cluster) -> Self {
        Self {
            cluster: redact_cluster(cluster),
        }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }
}

/// Replaces the spec of a cluster.
/// `cluster_version` is the version the caller last observed.
#[derive(Debug, Default, Clone)]
pub struct UpdateClusterRequest {
    pub cluster_id: ClusterId,
    pub cluster_version: Option<Version>,
    pub spec: Option<ClusterSpec>,
}

impl UpdateClusterRequest {
    pub fn new(cluster_id: impl Into<ClusterId>, version: impl Into<Version>, spec: ClusterSpec) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            cluster_version: Some(version.into()),
            spec: Some(spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateClusterResponse {
    cluster: Cluster,
}

impl UpdateClusterResponse {
    pub(crate) fn redacted(cluster: &Cluster) -> Self {
        Self {
            cluster: redact_cluster(cluster),
        }
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }
}

#[derive(Debug, Default, Clone)]
pub struct ListClustersRequest {
    pub filters: Option<ListClustersFilters>,
}

impl ListClustersRequest {
    pub fn with_filters(filters: ListClustersFilters) -> Self {
        Self {
            filters: Some(filters),
        }
    }
}

/// Each category matches when any of its values match, an empty category matches all
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListClustersFilters {
    pub names: Vec<Name>,
    pub id_prefixes: Vec<String>,
    /// label key to value, an empty value only requires the key
    pub labels: BTreeMap<LabelKey, LabelValue>,
}

impl ListClustersFilters {
    pub fn by_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Name>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn by_id_prefixes<I, N>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            id_prefixes: prefixes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<LabelKey>, value: impl Into<LabelValue>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ListClustersResponse {
    clusters: Vec<Cluster>,
}

impl ListClustersResponse {
    pub(crate) fn redacted(clusters: &[Cluster]) -> Self {
        Self {
            clusters: redact_clusters(clusters),
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}
