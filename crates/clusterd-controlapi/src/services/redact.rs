//!
//! # Redaction
//!
//! Builds the public view of a cluster from an allow list of fields.
//! Private key material is never copied; configured acceptance policy
//! secrets are replaced by a marker so callers can see one is set.
//!
use clusterd_metadata::cluster::{Cluster, RootCa};
use clusterd_types::defaults::REDACTED_MARKER;

pub fn redact_clusters(clusters: &[Cluster]) -> Vec<Cluster> {
    clusters.iter().map(redact_cluster).collect()
}

pub fn redact_cluster(cluster: &Cluster) -> Cluster {
    let mut redacted = Cluster {
        id: cluster.id.clone(),
        meta: cluster.meta.clone(),
        spec: cluster.spec.clone(),
        root_ca: cluster.root_ca.as_ref().map(|root_ca| RootCa {
            ca_cert: root_ca.ca_cert.clone(),
            ca_cert_hash: root_ca.ca_cert_hash.clone(),
            ..Default::default()
        }),
        ..Default::default()
    };

    for policy in redacted.spec.acceptance_policy.policies.iter_mut() {
        if policy.has_secret() {
            policy.secret = REDACTED_MARKER.to_owned();
        }
    }

    redacted
}
