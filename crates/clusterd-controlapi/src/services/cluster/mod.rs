//!
//! # Cluster control api
//!
//! Get, update and list clusters held in a metadata store.
//! Every cluster handed back to a caller has been redacted.
//!
mod get;
mod list;
mod update;

use clusterd_metadata::cluster::Cluster;
use clusterd_metadata::store::Store;

use crate::services::validate::SpecValidator;

pub struct ControlApi<S> {
    store: S,
    validator: SpecValidator,
}

impl<S> ControlApi<S>
where
    S: Store<Object = Cluster>,
{
    pub fn new(store: S, validator: SpecValidator) -> Self {
        Self { store, validator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
