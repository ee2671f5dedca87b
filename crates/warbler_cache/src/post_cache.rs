//! Memory-indexed, file-backed post cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;
use warbler_core::Post;
use warbler_error::{JsonError, StorageError, StorageErrorKind, WarblerResult};

/// Post cache keyed by post ID.
///
/// Files are grouped by conversation:
///
/// ```text
/// {base}/
/// ├── 1700000000000000001/
/// │   ├── 1700000000000000001.json
/// │   └── 1700000000000000007.json
/// └── 1700000000000000042/
///     └── 1700000000000000042.json
/// ```
///
/// A lookup checks the memory index first and otherwise scans every
/// conversation directory for `{id}.json`, since the conversation of an
/// arbitrary ID is not known up front. A file hit is added to the index
/// before it is returned.
///
/// Posts are immutable, so an entry is never overwritten once written.
#[derive(Debug)]
pub struct PostCache {
    base_dir: PathBuf,
    index: RwLock<HashMap<String, Post>>,
}

impl PostCache {
    /// Open a cache rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_dir))]
    pub fn new(base_dir: impl Into<PathBuf>) -> WarblerResult<Self> {
        let base_dir = base_dir.into();

        std::fs::create_dir_all(&base_dir)
            .map_err(|e| StorageError::at(StorageErrorKind::DirectoryCreation, &base_dir, e))?;

        tracing::info!(path = %base_dir.display(), "Opened post cache");
        Ok(Self {
            base_dir,
            index: RwLock::new(HashMap::new()),
        })
    }

    /// Root directory of the cache.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of posts currently held in the memory index.
    pub async fn indexed(&self) -> usize {
        self.index.read().await.len()
    }

    /// Look up a post by ID. A miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is not a valid file name, a cache file cannot
    /// be read, or a cache file does not contain a post.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> WarblerResult<Option<Post>> {
        validate_component(id)?;

        if let Some(post) = self.index.read().await.get(id) {
            tracing::trace!("Memory index hit");
            return Ok(Some(post.clone()));
        }

        let Some(path) = self.find_file(id).await? else {
            tracing::debug!("Cache miss");
            return Ok(None);
        };

        let post = read_post(&path).await?;
        tracing::debug!(path = %path.display(), "Loaded post from disk");
        self.index
            .write()
            .await
            .insert(id.to_string(), post.clone());
        Ok(Some(post))
    }

    /// Store a post under its conversation.
    ///
    /// A post already present in the index or on disk is left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the IDs are not valid file names or the file cannot
    /// be written.
    #[tracing::instrument(skip(self, post), fields(post_id = %post.id()))]
    pub async fn put(&self, post: &Post) -> WarblerResult<()> {
        let id = post.id();
        validate_component(id)?;

        if self.index.read().await.contains_key(id) {
            tracing::trace!("Post already indexed");
            return Ok(());
        }

        let conversation = conversation_key(post);
        validate_component(conversation)?;
        let dir = self.base_dir.join(conversation);
        let path = dir.join(format!("{}.json", id));

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Post already on disk");
        } else {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| StorageError::at(StorageErrorKind::DirectoryCreation, &dir, e))?;

            let data = serde_json::to_vec_pretty(post).map_err(JsonError::from)?;
            match write_atomic(&path, &data).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Cached post"),
                // Another writer stored the same immutable post first
                Err(e) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                    tracing::debug!(path = %path.display(), error = %e, "Post written concurrently");
                }
                Err(e) => return Err(e),
            }
        }

        self.index.write().await.insert(id.clone(), post.clone());
        Ok(())
    }

    /// Store every post in `posts`.
    ///
    /// # Errors
    ///
    /// Stops at the first post that fails to store.
    pub async fn put_all<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) -> WarblerResult<()> {
        for post in posts {
            self.put(post).await?;
        }
        Ok(())
    }

    async fn find_file(&self, id: &str) -> WarblerResult<Option<PathBuf>> {
        let file_name = format!("{}.json", id);

        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::at(StorageErrorKind::FileRead, &self.base_dir, e).into());
            }
        };

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::at(StorageErrorKind::FileRead, &self.base_dir, e)
        })? {
            let candidate = entry.path().join(&file_name);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }
}

/// Directory a post is filed under. Posts without a conversation ID start
/// their own conversation.
fn conversation_key(post: &Post) -> &str {
    if post.conversation_id().is_empty() {
        post.id()
    } else {
        post.conversation_id()
    }
}

fn validate_component(key: &str) -> WarblerResult<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.contains('\0');
    if invalid {
        return Err(StorageError::at(
            StorageErrorKind::InvalidPath,
            key,
            "not a single path component",
        )
        .into());
    }
    Ok(())
}

async fn read_post(path: &Path) -> WarblerResult<Post> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::at(StorageErrorKind::FileRead, path, e))?;

    serde_json::from_slice(&data)
        .map_err(|e| StorageError::at(StorageErrorKind::Corrupt, path, e).into())
}

/// Write to a temp file first, then rename into place.
///
/// Every call writes its own temp file next to `path`, so concurrent writers
/// of the same file never share one. The last rename wins.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> WarblerResult<()> {
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = tokio::fs::write(&temp_path, data).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StorageError::at(StorageErrorKind::FileWrite, &temp_path, e).into());
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StorageError::at(
            StorageErrorKind::FileWrite,
            path,
            format!("rename from {}: {}", temp_path.display(), e),
        )
        .into());
    }

    Ok(())
}
