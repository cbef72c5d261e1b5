//!
//! # Cluster Spec
//!
//! Desired state of a cluster, replaced as a whole on update.
//!
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use clusterd_types::{LabelKey, LabelValue, Name};

use super::ProtoDuration;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub ca_config: CaConfig,
    #[serde(default)]
    pub acceptance_policy: AcceptancePolicy,
}

impl ClusterSpec {
    pub fn named(name: impl Into<Name>) -> Self {
        Self {
            annotations: Annotations {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.annotations.name
    }

    pub fn with_label(mut self, key: impl Into<LabelKey>, value: impl Into<LabelValue>) -> Self {
        self.annotations.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_node_cert_expiry(mut self, expiry: impl Into<ProtoDuration>) -> Self {
        self.ca_config.node_cert_expiry = Some(expiry.into());
        self
    }

    pub fn with_policy(mut self, policy: RoleAdmissionPolicy) -> Self {
        self.acceptance_policy.policies.push(policy);
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub name: Name,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<LabelKey, LabelValue>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaConfig {
    /// lifetime of issued node certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_cert_expiry: Option<ProtoDuration>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    #[serde(default)]
    pub policies: Vec<RoleAdmissionPolicy>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    #[default]
    Worker,
    Manager,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Worker => write!(f, "worker"),
            Self::Manager => write!(f, "manager"),
        }
    }
}

/// How nodes of one role are admitted
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAdmissionPolicy {
    #[serde(default)]
    pub role: NodeRole,
    #[serde(default)]
    pub autoaccept: bool,
    /// one time join secret, empty when none is configured
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

impl RoleAdmissionPolicy {
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}
