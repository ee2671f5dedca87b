//! Post cache and snapshot storage errors.

use std::path::{Path, PathBuf};

/// Which filesystem step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorageErrorKind {
    /// Creating a directory
    #[display("create directory")]
    DirectoryCreation,
    /// Writing or renaming a file
    #[display("write")]
    FileWrite,
    /// Reading a file or listing a directory
    #[display("read")]
    FileRead,
    /// A key that cannot be used as a single path component
    #[display("invalid key")]
    InvalidPath,
    /// A stored file whose contents do not decode
    #[display("corrupt entry")]
    Corrupt,
}

/// Storage error naming the path involved, with location tracking.
///
/// # Examples
///
/// ```
/// use warbler_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::at(StorageErrorKind::InvalidPath, "../etc", "not a plain component");
/// assert_eq!(err.path().to_str(), Some("../etc"));
/// assert!(format!("{}", err).contains("invalid key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} {}: {} at line {} in {}", kind, path.display(), reason, line, file)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: PathBuf,
    reason: String,
    line: u32,
    file: &'static str,
}

impl StorageError {
    /// A `kind` failure on `path`.
    #[track_caller]
    pub fn at(kind: StorageErrorKind, path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// The failed step.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// The file or directory involved.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
