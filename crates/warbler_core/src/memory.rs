//! Memory records persisted for each conversation turn.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source tag written on every memory created from platform content.
pub const PLATFORM_SOURCE: &str = "twitter";

/// Content payload of a memory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryContent {
    /// Post text
    pub text: String,
    /// Public URL of the post, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Origin of the content
    pub source: String,
    /// Memory ID of the post this content replies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<Uuid>,
}

/// A persisted conversation turn.
///
/// The ID is derived from `(postId, agentId)` so creating a memory for the
/// same post twice always targets the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct Memory {
    /// Deterministic memory ID
    id: Uuid,
    /// Runtime user the turn belongs to
    user_id: Uuid,
    /// Agent that owns the memory
    agent_id: Uuid,
    /// Conversation room
    room_id: Uuid,
    /// Turn content
    content: MemoryContent,
    /// Creation time in epoch milliseconds
    created_at: i64,
}

impl Memory {
    /// Creates a new memory builder.
    pub fn builder() -> MemoryBuilder {
        MemoryBuilder::default()
    }
}
