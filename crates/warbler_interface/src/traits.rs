//! Collaborator traits consumed by the client.

use async_trait::async_trait;
use uuid::Uuid;
use warbler_core::{Credentials, Memory, Post, SearchMode, UserProfile};
use warbler_error::WarblerResult;

/// The remote social platform.
///
/// Every call may fail with a rate-limit error carrying a reset time or an
/// auth-expiry error; callers route calls through the request queue and auth
/// recovery rather than invoking these methods bare.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// The account the active credentials belong to.
    async fn current_user(&self) -> WarblerResult<UserProfile>;

    /// Fetch a single post. A post that does not exist is `Ok(None)`.
    async fn get_post(&self, id: &str) -> WarblerResult<Option<Post>>;

    /// Search recent posts.
    async fn search_posts(
        &self,
        query: &str,
        limit: u32,
        mode: SearchMode,
    ) -> WarblerResult<Vec<Post>>;

    /// The account's home timeline, newest first.
    async fn home_timeline(&self, count: u32) -> WarblerResult<Vec<Post>>;

    /// Publish a top-level post and return its ID.
    async fn create_post(&self, text: &str) -> WarblerResult<String>;

    /// Publish a reply to `parent_id` and return its ID.
    async fn reply_to_post(&self, text: &str, parent_id: &str) -> WarblerResult<String>;

    /// Exchange a refresh token for a new credential pair.
    async fn refresh_credentials(&self, refresh_token: &str) -> WarblerResult<Credentials>;
}

/// The agent's long-term memory store.
///
/// Treated as always available and synchronously consistent for the queries
/// the client issues.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Look up one memory by ID.
    async fn get_memory_by_id(&self, id: Uuid) -> WarblerResult<Option<Memory>>;

    /// All memories of `agent_id` in any of `room_ids`.
    async fn get_memories_by_room_ids(
        &self,
        agent_id: Uuid,
        room_ids: &[Uuid],
    ) -> WarblerResult<Vec<Memory>>;

    /// Persist a memory.
    async fn create_memory(&self, memory: Memory) -> WarblerResult<()>;

    /// The newest `count` memories of `agent_id` in `room_id`, newest first.
    async fn get_memories(
        &self,
        room_id: Uuid,
        agent_id: Uuid,
        count: usize,
    ) -> WarblerResult<Vec<Memory>>;
}

/// Identity and room bookkeeping of the agent runtime.
///
/// All operations are idempotent upserts, called before writing a memory
/// that references the user or room.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// The agent's own runtime ID.
    fn agent_id(&self) -> Uuid;

    /// Ensure a runtime user exists.
    async fn ensure_user_exists(
        &self,
        user_id: Uuid,
        handle: &str,
        name: Option<&str>,
        source: &str,
    ) -> WarblerResult<()>;

    /// Ensure a user exists and participates in a room.
    async fn ensure_connection(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        handle: Option<&str>,
        name: Option<&str>,
        source: &str,
    ) -> WarblerResult<()>;

    /// Ensure a room exists.
    async fn ensure_room_exists(&self, room_id: Uuid) -> WarblerResult<()>;

    /// Ensure a user participates in a room.
    async fn ensure_participant_in_room(&self, user_id: Uuid, room_id: Uuid) -> WarblerResult<()>;
}
