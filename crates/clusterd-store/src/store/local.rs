use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use clusterd_types::defaults::METADATA_FILE_EXTENSION;

use crate::core::StoreObject;

use super::StoreError;

/// suffix of object files still being written, never loaded
const STAGING_SUFFIX: &str = "staging";

/// Directory holding one yaml file per object, named after the object id
#[derive(Debug, Clone)]
pub struct LocalMetadataDir {
    base_path: PathBuf,
}

impl LocalMetadataDir {
    pub fn open<P: AsRef<Path>>(base_path: P) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn object_path(&self, id: &str) -> PathBuf {
        self.base_path
            .join(format!("{id}.{METADATA_FILE_EXTENSION}"))
    }

    fn staging_path(&self, id: &str) -> PathBuf {
        self.base_path
            .join(format!("{id}.{METADATA_FILE_EXTENSION}.{STAGING_SUFFIX}"))
    }

    /// load every parsable object, unreadable files are skipped
    pub fn load_all<O: StoreObject>(&self) -> Result<Vec<O>, StoreError> {
        info!(path = %self.base_path.display(), "loading {} metadata", O::LABEL);
        let mut objects = vec![];
        for entry in fs::read_dir(&self.base_path)? {
            let Ok(entry) = entry else {
                continue;
            };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(METADATA_FILE_EXTENSION) {
                continue;
            }
            match Self::load_object::<O>(&path) {
                Ok(obj) if obj.id().is_empty() => {
                    warn!(path = %path.display(), "skipped object without id");
                }
                Ok(obj) => {
                    debug!(id = obj.id(), "loaded {}", O::LABEL);
                    objects.push(obj);
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipped metadata file");
                }
            }
        }
        Ok(objects)
    }

    fn load_object<O: StoreObject>(path: &Path) -> Result<O, StoreError> {
        Ok(serde_yaml::from_reader(File::open(path)?)?)
    }

    /// Write committed changes, `None` removes the object file.
    /// Every object is staged first, so a failed write leaves existing files untouched.
    pub(crate) fn flush<O: StoreObject>(
        &self,
        changes: &BTreeMap<String, Option<O>>,
    ) -> Result<(), StoreError> {
        let mut staged: Vec<(PathBuf, PathBuf)> = vec![];
        for (id, obj) in changes
            .iter()
            .filter_map(|(id, change)| change.as_ref().map(|obj| (id, obj)))
        {
            let staging = self.staging_path(id);
            if let Err(err) = Self::write_object(&staging, obj) {
                warn!(id, %err, "unable to stage {}", O::LABEL);
                Self::discard_staged(staged.iter().map(|(staging, _)| staging).chain([&staging]));
                return Err(err);
            }
            staged.push((staging, self.object_path(id)));
        }

        for (staging, path) in &staged {
            fs::rename(staging, path)?;
        }

        for id in changes
            .iter()
            .filter_map(|(id, change)| change.is_none().then_some(id))
        {
            match fs::remove_file(self.object_path(id)) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        debug!(changes = changes.len(), "flushed {}", O::LABEL);
        Ok(())
    }

    fn write_object<O: StoreObject>(path: &Path, obj: &O) -> Result<(), StoreError> {
        let mut file = File::create(path)?;
        serde_yaml::to_writer(&mut file, obj)?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn discard_staged<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
        for path in paths {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), %err, "unable to remove staged file");
                }
            }
        }
    }
}
