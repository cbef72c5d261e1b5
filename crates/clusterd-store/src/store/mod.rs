//!
//! # Transactional metadata store
//!
//! Objects are only reachable inside a scoped transaction.
//! `view` hands out a read only snapshot, `update` hands out a writable
//! transaction which is committed only if the closure returns `Ok`.
//!
mod local;
mod memory;

use std::io::Error as IoError;

use thiserror::Error;

use crate::core::StoreObject;

pub use local::LocalMetadataDir;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// incoming version does not match the committed one
    #[error("update out of sequence")]
    SequenceConflict,
    #[error("object {0} does not exist")]
    NotExist(String),
    #[error("object {0} already exists")]
    Exist(String),
    #[error("invalid find selector: {0}")]
    InvalidFindBy(String),
    #[error("metadata io error: {0}")]
    Io(#[from] IoError),
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

/// Index selector for `ReadTx::find`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum By {
    /// name is any of these, compared case insensitively
    Names(Vec<String>),
    /// id starts with any of these
    IdPrefixes(Vec<String>),
    All,
}

impl By {
    pub fn names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn id_prefixes<I, N>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::IdPrefixes(prefixes.into_iter().map(Into::into).collect())
    }

    fn validate(&self) -> Result<(), StoreError> {
        match self {
            Self::Names(names) if names.is_empty() => {
                Err(StoreError::InvalidFindBy("empty name set".to_owned()))
            }
            Self::IdPrefixes(prefixes) if prefixes.is_empty() => {
                Err(StoreError::InvalidFindBy("empty id prefix set".to_owned()))
            }
            _ => Ok(()),
        }
    }

    pub fn matches<O: StoreObject>(&self, obj: &O) -> bool {
        match self {
            Self::Names(names) => names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(obj.name())),
            Self::IdPrefixes(prefixes) => prefixes
                .iter()
                .any(|prefix| obj.id().starts_with(prefix.as_str())),
            Self::All => true,
        }
    }
}

/// Read side of a transaction
pub trait ReadTx<O> {
    /// copy of the object with this id
    fn get(&self, id: &str) -> Option<O>;

    /// copies of all objects selected by the index, in id order
    fn find(&self, by: &By) -> Result<Vec<O>, StoreError>;
}

/// Write side of a transaction
pub trait WriteTx<O>: ReadTx<O> {
    /// insert new object, assigning an id when it has none. returns the id
    fn create(&mut self, obj: O) -> Result<String, StoreError>;

    /// replace an existing object.
    /// fails with `SequenceConflict` unless `obj` carries the committed version
    fn update(&mut self, obj: O) -> Result<(), StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait Store {
    type Object: StoreObject;

    /// run `read_fn` against a consistent snapshot
    async fn view<F, R>(&self, read_fn: F) -> R
    where
        F: FnOnce(&dyn ReadTx<Self::Object>) -> R;

    /// run `write_fn` in a transaction, committing only if it returns `Ok`
    async fn update<F, R, E>(&self, write_fn: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn WriteTx<Self::Object>) -> Result<R, E>,
        E: From<StoreError>;
}
