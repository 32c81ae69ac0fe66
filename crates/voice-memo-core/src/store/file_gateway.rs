//! Directory-backed key-value store.
//!
//! Each key maps to `<root>/<key>.json`. Writes go through a temp file that
//! is synced and renamed over the target, so a crash mid-write leaves the
//! previous value intact.

use crate::{CoreResult, MemoError, store::PersistenceGateway};

use std::{
    fs,
    io::{ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Key-value store persisted as one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    /// Open a store rooted at `root`, creating the directory if needed.
    #[track_caller]
    #[instrument(skip(root), fields(root = ?root.as_ref()))]
    pub fn open<P: AsRef<Path>>(root: P) -> CoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            fs::create_dir_all(&root)?;
            debug!(root = ?root, "Created store directory");
        }
        Ok(Self { root })
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[track_caller]
    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if !valid {
            return Err(MemoError::Persistence {
                reason: format!("invalid store key: {:?}", key),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for FileGateway {
    async fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        let read = tokio::task::spawn_blocking(move || match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        })
        .await
        .map_err(|e| MemoError::Persistence {
            reason: format!("Read task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        read.map_err(|e| MemoError::Persistence {
            reason: format!("Failed to read {}: {}", key, e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CoreResult<()> {
        let path = self.path_for(key)?;

        let write = tokio::task::spawn_blocking(move || write_atomic(&path, &value))
            .await
            .map_err(|e| MemoError::Persistence {
                reason: format!("Write task failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        write.map_err(|e| MemoError::Persistence {
            reason: format!("Failed to write {}: {}", key, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(key, "Value stored (atomic write)");

        Ok(())
    }
}

fn write_atomic(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let temp_path = path.with_extension("json.tmp");

    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(value)?;
    temp_file.sync_all()?;

    fs::rename(&temp_path, path)
}
