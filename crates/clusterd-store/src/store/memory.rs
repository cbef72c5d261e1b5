use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_lock::RwLock;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::core::{StoreObject, Version};

use super::{By, LocalMetadataDir, ReadTx, Store, StoreError, WriteTx};

/// In memory store with optional write-through to a metadata directory.
/// Readers share the lock, a writer holds it exclusively for the whole transaction,
/// which makes every transaction serializable.
pub struct MemoryStore<O: StoreObject> {
    state: RwLock<StoreState<O>>,
    local: Option<LocalMetadataDir>,
}

struct StoreState<O> {
    objects: BTreeMap<String, O>,
    /// version of the last committed transaction
    index: u64,
}

impl<O: StoreObject> Default for MemoryStore<O> {
    fn default() -> Self {
        Self {
            state: RwLock::new(StoreState {
                objects: BTreeMap::new(),
                index: 0,
            }),
            local: None,
        }
    }
}

impl<O: StoreObject> fmt::Debug for MemoryStore<O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} Store", O::LABEL)
    }
}

impl<O: StoreObject> MemoryStore<O> {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// open store backed by `base_path`, loading what is already there
    pub fn load_from<P: AsRef<Path>>(base_path: P) -> Result<Self, StoreError> {
        let local = LocalMetadataDir::open(base_path)?;
        let loaded: Vec<O> = local.load_all()?;

        let index = loaded
            .iter()
            .map(|obj| obj.meta().version.index)
            .max()
            .unwrap_or_default();
        let objects: BTreeMap<String, O> = loaded
            .into_iter()
            .map(|obj| (obj.id().to_owned(), obj))
            .collect();

        debug!(count = objects.len(), index, "loaded {} store", O::LABEL);
        Ok(Self {
            state: RwLock::new(StoreState { objects, index }),
            local: Some(local),
        })
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// version of the last committed write
    pub async fn current_version(&self) -> Version {
        Version::new(self.state.read().await.index)
    }
}

impl<O: StoreObject> Store for MemoryStore<O> {
    type Object = O;

    async fn view<F, R>(&self, read_fn: F) -> R
    where
        F: FnOnce(&dyn ReadTx<O>) -> R,
    {
        let state = self.state.read().await;
        let tx = MemoryReadTx {
            objects: &state.objects,
        };
        read_fn(&tx)
    }

    async fn update<F, R, E>(&self, write_fn: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn WriteTx<O>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut state = self.state.write().await;

        let proposed = Version::new(state.index + 1);
        let mut tx = MemoryWriteTx {
            base: &state.objects,
            changes: BTreeMap::new(),
            version: proposed,
            now: Utc::now(),
        };

        // dropping tx on error discards every staged change
        let result = write_fn(&mut tx)?;
        let changes = tx.changes;

        if changes.is_empty() {
            trace!("{} transaction without changes", O::LABEL);
            return Ok(result);
        }

        if let Some(local) = &self.local {
            local.flush(&changes)?;
        }

        let change_count = changes.len();
        for (id, change) in changes {
            match change {
                Some(obj) => {
                    state.objects.insert(id, obj);
                }
                None => {
                    state.objects.remove(&id);
                }
            }
        }
        state.index = proposed.index;

        debug!(
            version = %proposed,
            changes = change_count,
            "committed {} transaction",
            O::LABEL
        );
        Ok(result)
    }
}

impl<O: StoreObject> Store for Arc<MemoryStore<O>> {
    type Object = O;

    async fn view<F, R>(&self, read_fn: F) -> R
    where
        F: FnOnce(&dyn ReadTx<O>) -> R,
    {
        (**self).view(read_fn).await
    }

    async fn update<F, R, E>(&self, write_fn: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn WriteTx<O>) -> Result<R, E>,
        E: From<StoreError>,
    {
        (**self).update(write_fn).await
    }
}

fn find_in<'a, O, I>(objects: I, by: &By) -> Result<Vec<O>, StoreError>
where
    O: StoreObject,
    I: Iterator<Item = &'a O>,
{
    by.validate()?;
    Ok(objects.filter(|obj| by.matches(*obj)).cloned().collect())
}

struct MemoryReadTx<'a, O> {
    objects: &'a BTreeMap<String, O>,
}

impl<O: StoreObject> ReadTx<O> for MemoryReadTx<'_, O> {
    fn get(&self, id: &str) -> Option<O> {
        self.objects.get(id).cloned()
    }

    fn find(&self, by: &By) -> Result<Vec<O>, StoreError> {
        find_in(self.objects.values(), by)
    }
}

/// Staged changes on top of the committed objects.
/// `None` marks a deletion.
struct MemoryWriteTx<'a, O> {
    base: &'a BTreeMap<String, O>,
    changes: BTreeMap<String, Option<O>>,
    version: Version,
    now: DateTime<Utc>,
}

impl<O: StoreObject> MemoryWriteTx<'_, O> {
    fn current(&self, id: &str) -> Option<&O> {
        match self.changes.get(id) {
            Some(staged) => staged.as_ref(),
            None => self.base.get(id),
        }
    }

    fn merged(&self) -> BTreeMap<&str, &O> {
        let mut merged: BTreeMap<&str, &O> = self
            .base
            .iter()
            .map(|(id, obj)| (id.as_str(), obj))
            .collect();
        for (id, staged) in &self.changes {
            match staged {
                Some(obj) => {
                    merged.insert(id.as_str(), obj);
                }
                None => {
                    merged.remove(id.as_str());
                }
            }
        }
        merged
    }
}

impl<O: StoreObject> ReadTx<O> for MemoryWriteTx<'_, O> {
    fn get(&self, id: &str) -> Option<O> {
        self.current(id).cloned()
    }

    fn find(&self, by: &By) -> Result<Vec<O>, StoreError> {
        find_in(self.merged().into_values(), by)
    }
}

impl<O: StoreObject> WriteTx<O> for MemoryWriteTx<'_, O> {
    fn create(&mut self, mut obj: O) -> Result<String, StoreError> {
        if obj.id().is_empty() {
            obj.set_id(Uuid::new_v4().simple().to_string());
        }
        let id = obj.id().to_owned();
        if self.current(&id).is_some() {
            return Err(StoreError::Exist(id));
        }

        let meta = obj.meta_mut();
        meta.version = self.version;
        meta.created_at = Some(self.now);
        meta.updated_at = Some(self.now);

        trace!(%id, "staging create {}", O::LABEL);
        self.changes.insert(id.clone(), Some(obj));
        Ok(id)
    }

    fn update(&mut self, mut obj: O) -> Result<(), StoreError> {
        let id = obj.id().to_owned();
        let committed = self
            .current(&id)
            .ok_or_else(|| StoreError::NotExist(id.clone()))?;

        if committed.meta().version != obj.meta().version {
            debug!(
                %id,
                committed = %committed.meta().version,
                incoming = %obj.meta().version,
                "{} version conflict",
                O::LABEL
            );
            return Err(StoreError::SequenceConflict);
        }

        let created_at = committed.meta().created_at;
        let meta = obj.meta_mut();
        meta.version = self.version;
        meta.created_at = created_at;
        meta.updated_at = Some(self.now);

        trace!(%id, "staging update {}", O::LABEL);
        self.changes.insert(id, Some(obj));
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if self.current(id).is_none() {
            return Err(StoreError::NotExist(id.to_owned()));
        }
        self.changes.insert(id.to_owned(), None);
        Ok(())
    }
}
