//!
//! # Cluster
//!
//! Cluster wide configuration object. Carries public identity and spec
//! next to private key material which must stay inside the store.
//!
mod duration;
mod spec;

use serde::{Deserialize, Serialize};

use clusterd_types::ClusterId;

use crate::core::{Meta, StoreObject};

pub use duration::{DurationError, ProtoDuration};
pub use spec::*;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub id: ClusterId,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub spec: ClusterSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<RootCa>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_bootstrap_keys: Vec<EncryptionKey>,
}

impl Cluster {
    pub fn new(spec: ClusterSpec) -> Self {
        Self {
            spec,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<ClusterId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_root_ca(mut self, root_ca: RootCa) -> Self {
        self.root_ca = Some(root_ca);
        self
    }

    pub fn with_bootstrap_key(mut self, key: EncryptionKey) -> Self {
        self.network_bootstrap_keys.push(key);
        self
    }
}

impl StoreObject for Cluster {
    const LABEL: &'static str = "Cluster";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.spec.annotations.name
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

/// Root certificate authority of the cluster
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCa {
    /// PEM encoded certificate, public
    #[serde(default)]
    pub ca_cert: String,
    /// digest of the certificate, public
    #[serde(default)]
    pub ca_cert_hash: String,
    /// PEM encoded private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca_key: String,
}

impl RootCa {
    pub fn has_key(&self) -> bool {
        !self.ca_key.is_empty()
    }
}

/// Key shared by managers to bootstrap encrypted networking
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionKey {
    pub subsystem: String,
    pub algorithm: String,
    pub key: String,
    #[serde(default)]
    pub lamport_time: u64,
}
