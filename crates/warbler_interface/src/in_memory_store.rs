//! In-memory implementation of [`MemoryStore`].

use crate::MemoryStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;
use warbler_core::Memory;
use warbler_error::WarblerResult;

/// Memory store backed by a hash map.
///
/// Creating a memory whose ID already exists replaces the stored record.
/// Clones share the same underlying storage.
///
/// # Example
///
/// ```rust
/// use warbler_interface::{InMemoryMemoryStore, MemoryStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryMemoryStore::new();
/// assert!(store.get_memory_by_id(Uuid::nil()).await?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemoryStore {
    memories: Arc<RwLock<HashMap<Uuid, Memory>>>,
}

impl InMemoryMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored memories.
    pub async fn len(&self) -> usize {
        self.memories.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.memories.read().await.is_empty()
    }

    /// Snapshot of every stored memory.
    pub async fn all(&self) -> Vec<Memory> {
        self.memories.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn get_memory_by_id(&self, id: Uuid) -> WarblerResult<Option<Memory>> {
        Ok(self.memories.read().await.get(&id).cloned())
    }

    async fn get_memories_by_room_ids(
        &self,
        agent_id: Uuid,
        room_ids: &[Uuid],
    ) -> WarblerResult<Vec<Memory>> {
        let memories = self.memories.read().await;
        Ok(memories
            .values()
            .filter(|m| *m.agent_id() == agent_id && room_ids.contains(m.room_id()))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, memory), fields(memory_id = %memory.id()))]
    async fn create_memory(&self, memory: Memory) -> WarblerResult<()> {
        debug!("Storing memory");
        self.memories.write().await.insert(*memory.id(), memory);
        Ok(())
    }

    async fn get_memories(
        &self,
        room_id: Uuid,
        agent_id: Uuid,
        count: usize,
    ) -> WarblerResult<Vec<Memory>> {
        let memories = self.memories.read().await;
        let mut in_room: Vec<Memory> = memories
            .values()
            .filter(|m| *m.agent_id() == agent_id && *m.room_id() == room_id)
            .cloned()
            .collect();
        in_room.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        in_room.truncate(count);
        Ok(in_room)
    }
}
