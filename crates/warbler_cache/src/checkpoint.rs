//! Last-processed post ID persisted between runs.

use crate::post_cache::write_atomic;
use std::path::{Path, PathBuf};
use warbler_error::{StorageError, StorageErrorKind, WarblerResult};

/// Single-value file holding the newest post ID already handled.
///
/// Post IDs are decimal snowflakes, so a numerically larger ID is newer.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    /// Checkpoint stored at `path`. Nothing is touched until the first store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing the checkpoint.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored ID. A missing or blank file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub async fn load(&self) -> WarblerResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::at(StorageErrorKind::FileRead, &self.path, e).into()),
        }
    }

    /// Overwrite the stored ID.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn store(&self, id: &str) -> WarblerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::at(StorageErrorKind::DirectoryCreation, parent, e))?;
        }
        write_atomic(&self.path, id.as_bytes()).await?;
        tracing::debug!("Checkpoint stored");
        Ok(())
    }

    /// Store `id` only if it is newer than the stored ID. Returns whether the
    /// checkpoint moved.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or written.
    pub async fn advance(&self, id: &str) -> WarblerResult<bool> {
        let newer = match self.load().await? {
            Some(current) => is_newer(id, &current),
            None => true,
        };
        if newer {
            self.store(id).await?;
        }
        Ok(newer)
    }
}

/// Compare decimal IDs without parsing them into a fixed-width integer.
fn is_newer(candidate: &str, current: &str) -> bool {
    let candidate = candidate.trim_start_matches('0');
    let current = current.trim_start_matches('0');
    (candidate.len(), candidate) > (current.len(), current)
}
