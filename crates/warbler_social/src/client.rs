//! Account client tying the queue, auth recovery, cache and memory together.

use crate::{
    AuthConfig, AuthRecovery, CredentialStore, Publisher, ThreadBuilder, TimelinePopulator,
    TwitterConfig,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use warbler_cache::{Checkpoint, PostCache};
use warbler_core::{
    Memory, MemoryContent, PLATFORM_SOURCE, Post, SearchMode, UserProfile, ids,
};
use warbler_error::{BuilderError, ConfigError, ConfigErrorKind, WarblerResult};
use warbler_interface::{AgentRuntime, MemoryStore, PlatformApi};
use warbler_rate_limit::{QueueConfig, RequestQueue};

type BoxFuture<T> = std::pin::Pin<Box<dyn Future<Output = T> + Send>>;

/// External collaborators of a [`TwitterClient`].
#[derive(Clone)]
pub struct Collaborators {
    /// Remote platform
    pub api: Arc<dyn PlatformApi>,
    /// Long-term memory store
    pub memory: Arc<dyn MemoryStore>,
    /// Identity and room bookkeeping
    pub runtime: Arc<dyn AgentRuntime>,
    /// Credential pair shared with the platform client
    pub credentials: CredentialStore,
}

/// Configuration sections a [`TwitterClient`] consumes.
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    /// Request pacing
    pub queue: QueueConfig,
    /// Auth recovery
    pub auth: AuthConfig,
    /// Account settings
    pub twitter: TwitterConfig,
}

/// One authenticated platform account.
///
/// All remote calls go through [`dispatch`](Self::dispatch): the request
/// queue serializes them and auth recovery wraps each attempt. Fetched posts
/// are cached before they are returned.
///
/// Clones share the queue, cache, and credentials.
#[derive(Clone)]
pub struct TwitterClient {
    api: Arc<dyn PlatformApi>,
    memory: Arc<dyn MemoryStore>,
    runtime: Arc<dyn AgentRuntime>,
    queue: RequestQueue,
    auth: AuthRecovery,
    cache: Arc<PostCache>,
    checkpoint: Checkpoint,
    config: TwitterConfig,
    profile: UserProfile,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Authenticate, register the agent with the runtime and ingest the
    /// current timeline.
    ///
    /// # Errors
    ///
    /// Returns error if the authenticated user cannot be resolved, the
    /// configured username does not match it, or timeline population fails.
    #[instrument(skip_all)]
    pub async fn connect(
        collaborators: Collaborators,
        settings: ClientSettings,
    ) -> WarblerResult<Self> {
        let queue = RequestQueue::new(settings.queue.clone());
        let auth = AuthRecovery::new(
            Arc::clone(&collaborators.api),
            collaborators.credentials.clone(),
            settings.auth.clone(),
        );

        let api = Arc::clone(&collaborators.api);
        let recovery = auth.clone();
        let profile = queue
            .submit(move || {
                let api = Arc::clone(&api);
                let recovery = recovery.clone();
                async move { recovery.execute(|| api.current_user()).await }
            })
            .await?;

        if let Some(expected) = settings.twitter.username() {
            if !expected.eq_ignore_ascii_case(profile.handle()) {
                error!(expected = %expected, actual = %profile.handle(), "Credentials belong to another account");
                return Err(ConfigError::new(ConfigErrorKind::AccountMismatch {
                    expected: expected.clone(),
                    actual: profile.handle().clone(),
                })
                .into());
            }
        }
        info!(user_id = %profile.id(), handle = %profile.handle(), "Authenticated");

        let client = Self::assemble(collaborators, settings, queue, auth, profile)?;

        client
            .runtime
            .ensure_user_exists(
                client.agent_id(),
                client.profile.handle(),
                client.profile.name().as_deref(),
                PLATFORM_SOURCE,
            )
            .await?;

        let ingested = client.timeline().refresh_timeline().await?;
        info!(ingested, "Timeline populated");
        Ok(client)
    }

    /// Build a client for an already known account without any remote call.
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be created.
    pub fn with_profile(
        collaborators: Collaborators,
        settings: ClientSettings,
        profile: UserProfile,
    ) -> WarblerResult<Self> {
        let queue = RequestQueue::new(settings.queue.clone());
        let auth = AuthRecovery::new(
            Arc::clone(&collaborators.api),
            collaborators.credentials.clone(),
            settings.auth.clone(),
        );
        Self::assemble(collaborators, settings, queue, auth, profile)
    }

    fn assemble(
        collaborators: Collaborators,
        settings: ClientSettings,
        queue: RequestQueue,
        auth: AuthRecovery,
        profile: UserProfile,
    ) -> WarblerResult<Self> {
        let cache = PostCache::new(settings.twitter.cache_dir())?;
        let checkpoint = Checkpoint::new(settings.twitter.checkpoint_path());
        Ok(Self {
            api: collaborators.api,
            memory: collaborators.memory,
            runtime: collaborators.runtime,
            queue,
            auth,
            cache: Arc::new(cache),
            checkpoint,
            config: settings.twitter,
            profile,
        })
    }

    /// The authenticated account.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Account settings.
    pub fn config(&self) -> &TwitterConfig {
        &self.config
    }

    /// The agent's runtime ID.
    pub fn agent_id(&self) -> Uuid {
        self.runtime.agent_id()
    }

    /// The post cache.
    pub fn cache(&self) -> &PostCache {
        &self.cache
    }

    /// The request queue all remote calls go through.
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// The memory store.
    pub fn memory(&self) -> &dyn MemoryStore {
        self.memory.as_ref()
    }

    /// The agent runtime.
    pub fn runtime(&self) -> &dyn AgentRuntime {
        self.runtime.as_ref()
    }

    /// Thread reconstruction for this account.
    pub fn threads(&self) -> ThreadBuilder<'_> {
        ThreadBuilder::new(self)
    }

    /// Timeline reconciliation for this account.
    pub fn timeline(&self) -> TimelinePopulator<'_> {
        TimelinePopulator::new(self)
    }

    /// Publishing for this account.
    pub fn publisher(&self) -> Publisher<'_> {
        Publisher::new(self)
    }

    /// Run a remote call through the request queue and auth recovery.
    ///
    /// `operation` receives the platform API and may be invoked several
    /// times, once per attempt.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once both layers give up.
    pub async fn dispatch<F, Fut, T>(&self, operation: F) -> WarblerResult<T>
    where
        F: Fn(Arc<dyn PlatformApi>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.submit(self.authenticated(operation)).await
    }

    /// Like [`dispatch`](Self::dispatch), for calls that create something on
    /// the platform.
    ///
    /// A failure that leaves it unknown whether the platform applied the
    /// call is returned instead of retried, so a post is never published
    /// twice.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once both layers give up.
    pub async fn dispatch_write<F, Fut, T>(&self, operation: F) -> WarblerResult<T>
    where
        F: Fn(Arc<dyn PlatformApi>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.submit_once(self.authenticated(operation)).await
    }

    fn authenticated<F, Fut, T>(
        &self,
        operation: F,
    ) -> impl FnMut() -> BoxFuture<WarblerResult<T>> + Send + 'static
    where
        F: Fn(Arc<dyn PlatformApi>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = WarblerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let auth = self.auth.clone();
        move || {
            let api = Arc::clone(&api);
            let auth = auth.clone();
            let operation = operation.clone();
            Box::pin(async move { auth.execute(|| operation(Arc::clone(&api))).await })
        }
    }

    /// Fetch a post, preferring the cache. A post that does not exist is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be read or the remote fetch fails.
    #[instrument(skip(self))]
    pub async fn get_post(&self, id: &str) -> WarblerResult<Option<Post>> {
        if let Some(post) = self.cache.get(id).await? {
            debug!("Served from cache");
            return Ok(Some(post));
        }

        let owned = id.to_string();
        let fetched = self
            .dispatch(move |api| {
                let id = owned.clone();
                async move { api.get_post(&id).await }
            })
            .await?;

        if let Some(post) = &fetched {
            self.cache.put(post).await?;
        }
        Ok(fetched)
    }

    /// Search recent posts and cache the results.
    ///
    /// # Errors
    ///
    /// Returns error if the search or caching fails.
    #[instrument(skip(self))]
    pub async fn search_posts(
        &self,
        query: &str,
        limit: u32,
        mode: SearchMode,
    ) -> WarblerResult<Vec<Post>> {
        let owned = query.to_string();
        let posts = self
            .dispatch(move |api| {
                let query = owned.clone();
                async move { api.search_posts(&query, limit, mode).await }
            })
            .await?;
        self.cache.put_all(&posts).await?;
        debug!(count = posts.len(), "Search complete");
        Ok(posts)
    }

    /// Fetch the home timeline and cache the results.
    ///
    /// # Errors
    ///
    /// Returns error if the fetch or caching fails.
    #[instrument(skip(self))]
    pub async fn home_timeline(&self, count: u32) -> WarblerResult<Vec<Post>> {
        let posts = self
            .dispatch(move |api| async move { api.home_timeline(count).await })
            .await?;
        self.cache.put_all(&posts).await?;
        Ok(posts)
    }

    /// Persist an incoming message unless the newest memory in its room
    /// already carries the same content. Returns whether it was stored.
    ///
    /// # Errors
    ///
    /// Returns error if the memory store fails.
    #[instrument(skip(self, memory), fields(memory_id = %memory.id()))]
    pub async fn save_request_message(&self, memory: Memory) -> WarblerResult<bool> {
        if memory.content().text.is_empty() {
            debug!("Empty message, nothing to save");
            return Ok(false);
        }

        let newest = self
            .memory
            .get_memories(*memory.room_id(), self.agent_id(), 1)
            .await?;
        if newest
            .first()
            .is_some_and(|recent| recent.content() == memory.content())
        {
            debug!("Message already recorded");
            return Ok(false);
        }

        self.memory.create_memory(memory).await?;
        Ok(true)
    }

    /// The newest post ID already handled, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the checkpoint file cannot be read.
    pub async fn last_checked_post_id(&self) -> WarblerResult<Option<String>> {
        self.checkpoint.load().await
    }

    /// Move the checkpoint forward to `id` if it is newer.
    ///
    /// # Errors
    ///
    /// Returns error if the checkpoint file cannot be written.
    pub async fn mark_checked(&self, id: &str) -> WarblerResult<bool> {
        self.checkpoint.advance(id).await
    }

    /// Runtime user ID of a post's author.
    pub fn author_user_id(&self, post: &Post) -> Uuid {
        ids::user_id(post.author_id(), Some(self.profile.id().as_str()), self.agent_id())
    }

    /// Room ID of a post's conversation.
    pub fn room_of(&self, post: &Post) -> Uuid {
        let conversation = if post.conversation_id().is_empty() {
            post.id()
        } else {
            post.conversation_id()
        };
        ids::room_id(conversation, self.agent_id())
    }

    /// Memory record for a post authored by `user_id`.
    pub fn memory_for(&self, post: &Post, user_id: Uuid) -> WarblerResult<Memory> {
        let agent_id = self.agent_id();
        let url = (!post.permanent_url().is_empty()).then(|| post.permanent_url().clone());
        let memory = Memory::builder()
            .id(ids::memory_id(post.id(), agent_id))
            .user_id(user_id)
            .agent_id(agent_id)
            .room_id(self.room_of(post))
            .content(MemoryContent {
                text: post.text().clone(),
                url,
                source: PLATFORM_SOURCE.to_string(),
                in_reply_to: post
                    .in_reply_to_id()
                    .as_deref()
                    .map(|parent| ids::memory_id(parent, agent_id)),
            })
            .created_at(post.created_at_millis())
            .build()
            .map_err(|e| BuilderError::incomplete("Memory", e))?;
        Ok(memory)
    }

    /// Record a post as a memory unless one already exists, linking its
    /// author to the conversation room first. Returns whether a memory was
    /// created.
    ///
    /// # Errors
    ///
    /// Returns error if the runtime or memory store fails.
    #[instrument(skip(self, post), fields(post_id = %post.id()))]
    pub async fn remember_post(&self, post: &Post) -> WarblerResult<bool> {
        let memory_id = ids::memory_id(post.id(), self.agent_id());
        if self.memory.get_memory_by_id(memory_id).await?.is_some() {
            debug!("Memory already exists");
            return Ok(false);
        }

        let user_id = self.author_user_id(post);
        let room_id = self.room_of(post);
        let own = user_id == self.agent_id();
        let (handle, name) = if own {
            (
                Some(self.profile.handle().as_str()),
                self.profile.name().as_deref(),
            )
        } else {
            (post.author_handle().as_deref(), post.author_name().as_deref())
        };

        self.runtime
            .ensure_connection(user_id, room_id, handle, name, PLATFORM_SOURCE)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to link author to room"))?;

        let memory = self.memory_for(post, user_id)?;
        self.memory
            .create_memory(memory)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to persist memory"))?;
        Ok(true)
    }
}
