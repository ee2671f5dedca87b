//! Timeline reconciliation against persisted memory.

use crate::TwitterClient;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use warbler_core::{Post, SearchMode, ids};
use warbler_error::{JsonError, StorageError, StorageErrorKind, WarblerResult};

/// Ingests timeline posts the agent has not remembered yet.
#[derive(Debug, Clone, Copy)]
pub struct TimelinePopulator<'a> {
    client: &'a TwitterClient,
}

impl<'a> TimelinePopulator<'a> {
    /// Populator for the account of `client`.
    pub fn new(client: &'a TwitterClient) -> Self {
        Self { client }
    }

    /// Persist a memory for every post in `posts` that the store does not
    /// already know. Returns the number of memories created.
    ///
    /// Known posts are found with one room-scoped query over the
    /// conversations of `posts`; duplicates within `posts` are ingested once.
    ///
    /// # Errors
    ///
    /// Returns error if the memory store, runtime or cache fails.
    #[instrument(skip(self, posts), fields(count = posts.len()))]
    pub async fn populate_timeline(&self, posts: &[Post]) -> WarblerResult<usize> {
        let mut known = self.known_memory_ids(posts).await?;
        let agent_id = self.client.agent_id();

        let mut created = 0;
        for post in posts {
            let memory_id = ids::memory_id(post.id(), agent_id);
            if !known.insert(memory_id) {
                debug!(post_id = %post.id(), "Already remembered");
                continue;
            }
            self.client.cache().put(post).await?;
            if self.client.remember_post(post).await? {
                created += 1;
            }
        }

        info!(created, skipped = posts.len() - created, "Timeline reconciled");
        Ok(created)
    }

    /// Bring memory up to date with the account's recent activity.
    ///
    /// A snapshot from a previous run that overlaps persisted memory is
    /// trusted: only its unknown posts are ingested and nothing is fetched.
    /// Otherwise the home timeline and the latest mentions are fetched, their
    /// unknown posts ingested, and the home timeline saved as the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be read or written, a fetch fails,
    /// or ingestion fails.
    #[instrument(skip(self))]
    pub async fn refresh_timeline(&self) -> WarblerResult<usize> {
        let config = self.client.config();
        let snapshot = load_snapshot(config.timeline_snapshot()).await?;

        if let Some(cached) = &snapshot {
            let known = self.known_memory_ids(cached).await?;
            let agent_id = self.client.agent_id();
            let overlaps = cached
                .iter()
                .any(|post| known.contains(&ids::memory_id(post.id(), agent_id)));
            if overlaps {
                debug!(snapshot = cached.len(), "Snapshot overlaps memory, skipping fetch");
                return self.populate_timeline(cached).await;
            }
        }

        let count = if snapshot.is_some() {
            *config.timeline_refresh_count()
        } else {
            *config.timeline_count()
        };
        let timeline = self.client.home_timeline(count).await?;
        let mentions = self
            .client
            .search_posts(
                &format!("@{}", self.client.profile().handle()),
                *config.mentions_count(),
                SearchMode::Latest,
            )
            .await?;

        let mut seen = HashSet::new();
        let combined: Vec<Post> = timeline
            .iter()
            .chain(mentions.iter())
            .filter(|post| seen.insert(post.id().clone()))
            .cloned()
            .collect();

        let created = self.populate_timeline(&combined).await?;
        store_snapshot(config.timeline_snapshot(), &timeline).await?;
        Ok(created)
    }

    async fn known_memory_ids(&self, posts: &[Post]) -> WarblerResult<HashSet<Uuid>> {
        if posts.is_empty() {
            return Ok(HashSet::new());
        }

        let mut room_ids: Vec<Uuid> = posts.iter().map(|post| self.client.room_of(post)).collect();
        room_ids.sort_unstable();
        room_ids.dedup();

        let existing = self
            .client
            .memory()
            .get_memories_by_room_ids(self.client.agent_id(), &room_ids)
            .await?;
        Ok(existing.iter().map(|memory| *memory.id()).collect())
    }
}

async fn load_snapshot(path: &Path) -> WarblerResult<Option<Vec<Post>>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::at(StorageErrorKind::FileRead, path, e).into());
        }
    };

    let posts: Vec<Post> = serde_json::from_slice(&data)
        .map_err(|e| StorageError::at(StorageErrorKind::Corrupt, path, e))?;
    Ok(Some(posts))
}

async fn store_snapshot(path: &Path, posts: &[Post]) -> WarblerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::at(StorageErrorKind::DirectoryCreation, parent, e))?;
    }

    let data = serde_json::to_vec_pretty(posts).map_err(JsonError::from)?;
    tokio::fs::write(path, data)
        .await
        .map_err(|e| StorageError::at(StorageErrorKind::FileWrite, path, e))?;
    debug!(path = %path.display(), count = posts.len(), "Timeline snapshot written");
    Ok(())
}
