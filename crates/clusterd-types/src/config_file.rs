use std::fmt::Debug;
use std::fs::{File, read_to_string};
use std::io::{Error as IoError, Write};
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] IoError),
    #[error("invalid toml config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unable to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// TOML persistence for any serde configuration
pub trait SaveLoadConfig: Sized {
    fn save_to<T: AsRef<Path>>(&self, path: T) -> Result<(), LoadConfigError>;

    fn load_from<T: AsRef<Path>>(path: T) -> Result<Self, LoadConfigError>;

    fn load_str(config: &str) -> Result<Self, LoadConfigError>;
}

impl<S> SaveLoadConfig for S
where
    S: Serialize + DeserializeOwned + Debug,
{
    fn save_to<T: AsRef<Path>>(&self, path: T) -> Result<(), LoadConfigError> {
        let path_ref = path.as_ref();
        debug!(?path_ref, "saving config");
        let content = toml::to_string(self)?;

        let mut file = File::create(path_ref)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn load_from<T: AsRef<Path>>(path: T) -> Result<Self, LoadConfigError> {
        let path_ref = path.as_ref();
        debug!(?path_ref, "loading config");

        let content = read_to_string(path_ref)?;
        Self::load_str(&content)
    }

    fn load_str(config: &str) -> Result<Self, LoadConfigError> {
        Ok(toml::from_str(config)?)
    }
}
