use std::time::Duration;

use tracing::debug;

use clusterd_metadata::cluster::ClusterSpec;
use clusterd_types::defaults::MIN_NODE_CERT_EXPIRY;

use crate::error::ControlApiError;

/// Checks a proposed spec before any store access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecValidator {
    min_node_cert_expiry: Duration,
}

impl Default for SpecValidator {
    fn default() -> Self {
        Self::new(MIN_NODE_CERT_EXPIRY)
    }
}

impl SpecValidator {
    pub fn new(min_node_cert_expiry: Duration) -> Self {
        Self {
            min_node_cert_expiry,
        }
    }

    pub fn min_node_cert_expiry(&self) -> Duration {
        self.min_node_cert_expiry
    }

    pub fn validate(&self, spec: Option<&ClusterSpec>) -> Result<(), ControlApiError> {
        let spec = spec.ok_or_else(ControlApiError::invalid_argument)?;

        if let Some(expiry) = &spec.ca_config.node_cert_expiry {
            let expiry_nanos = expiry.as_nanos().map_err(|err| {
                debug!(%err, "invalid node cert expiry");
                ControlApiError::invalid_argument()
            })?;

            if expiry_nanos < self.min_node_cert_expiry.as_nanos() as i128 {
                return Err(ControlApiError::InvalidArgument(format!(
                    "minimum certificate expiry time is: {}",
                    humantime::format_duration(self.min_node_cert_expiry)
                )));
            }
        }

        Ok(())
    }
}
