//! Filesystem image store on `cap-std`.
//!
//! All paths resolve inside the configured root, so a crafted key cannot
//! escape it. Writes go to a staging name first and are renamed into place,
//! which keeps readers from observing half-written files.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{ImageStore, StorageError};

/// Image store rooted at a directory.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
}

impl FsImageStore {
    /// Open (creating if needed) the directory at `root`.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, StorageError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| StorageError::io(err.to_string()))?
    }
}

fn map_io(key: &str, error: io::Error) -> StorageError {
    if error.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(key)
    } else {
        StorageError::io(format!("{key}: {error}"))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let key = key.to_owned();
        self.blocking(move |dir| {
            let staging = format!(".staging-{}", Uuid::new_v4().simple());
            dir.write(&staging, &bytes).map_err(|err| map_io(&key, err))?;
            if let Err(err) = dir.rename(&staging, dir, &key) {
                let _cleanup = dir.remove_file(&staging);
                return Err(map_io(&key, err));
            }
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let key = key.to_owned();
        self.blocking(move |dir| dir.read(&key).map_err(|err| map_io(&key, err)))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_owned();
        self.blocking(move |dir| match dir.remove_file(&key) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(map_io(&key, err)),
            _ => Ok(()),
        })
        .await
    }
}
