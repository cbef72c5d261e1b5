//!
//! # Store object model
//!
//! Bookkeeping shared by every object kept in the metadata store.
//!
use std::fmt::{self, Debug, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use clusterd_types::VersionIndex;

/// Optimistic concurrency token.
/// A write is accepted only when the incoming object carries the committed version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub index: VersionIndex,
}

impl Version {
    pub fn new(index: VersionIndex) -> Self {
        Self { index }
    }
}

impl From<VersionIndex> for Version {
    fn from(index: VersionIndex) -> Self {
        Self { index }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Meta {
    pub fn with_version(version: impl Into<Version>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Object that can live in the metadata store
pub trait StoreObject:
    Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const LABEL: &'static str;

    /// store assigned identifier, empty until created
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// user facing name, used by the name index
    fn name(&self) -> &str;

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;
}
