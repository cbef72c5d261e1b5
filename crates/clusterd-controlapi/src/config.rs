//!
//! # Control api configuration
//!
//! Loaded from TOML, then overridden by command line flags.
//!
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use clusterd_types::defaults::MIN_NODE_CERT_EXPIRY;

use crate::services::validate::SpecValidator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ControlApiConfig {
    /// directory of cluster metadata files, in memory only when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_dir: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub min_node_cert_expiry: Duration,
}

impl Default for ControlApiConfig {
    fn default() -> Self {
        Self {
            metadata_dir: None,
            min_node_cert_expiry: MIN_NODE_CERT_EXPIRY,
        }
    }
}

impl ControlApiConfig {
    pub fn validator(&self) -> SpecValidator {
        SpecValidator::new(self.min_node_cert_expiry)
    }
}
