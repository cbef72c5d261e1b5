//!
//! # Defaults
//!
//! Values shared by the control api and the CA subsystem boundary.
//!
use std::time::Duration;

/// Minimum lifetime of an issued node certificate
pub const MIN_NODE_CERT_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Replaces configured acceptance policy secrets in api responses
pub const REDACTED_MARKER: &str = "[REDACTED]";

pub const CONFIG_FILE_NAME: &str = "controlapi.toml";
pub const METADATA_FILE_EXTENSION: &str = "yaml";
