//! Deterministic identifiers linking posts to memories, rooms, and users.
//!
//! Every ID is a UUIDv5 over a fixed namespace, so recomputing an ID from the
//! same inputs always yields the same key. That property is what makes memory
//! creation safe to attempt more than once.

use uuid::Uuid;

const NAMESPACE: Uuid = Uuid::from_u128(0x6f2b_6c5e_9d4a_4c1b_8e37_2a91_d0c4_5b18);

/// Hash an arbitrary string into a stable UUID.
pub fn string_to_uuid(value: &str) -> Uuid {
    Uuid::new_v5(&NAMESPACE, value.as_bytes())
}

/// Memory ID for a post as seen by one agent.
pub fn memory_id(post_id: &str, agent_id: Uuid) -> Uuid {
    string_to_uuid(&format!("{}-{}", post_id, agent_id))
}

/// Room ID for a conversation as seen by one agent.
pub fn room_id(conversation_id: &str, agent_id: Uuid) -> Uuid {
    string_to_uuid(&format!("{}-{}", conversation_id, agent_id))
}

/// Runtime user ID for a post author.
///
/// The authenticated account maps onto the agent itself.
pub fn user_id(author_id: &str, own_user_id: Option<&str>, agent_id: Uuid) -> Uuid {
    if own_user_id == Some(author_id) {
        agent_id
    } else {
        string_to_uuid(author_id)
    }
}
