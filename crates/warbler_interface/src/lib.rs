//! Trait definitions for the collaborators of the warbler client.
//!
//! The client consumes three external surfaces:
//! - [`PlatformApi`] - the remote social platform
//! - [`MemoryStore`] - the agent's long-term memory
//! - [`AgentRuntime`] - idempotent identity and room upserts
//!
//! [`InMemoryMemoryStore`] is a reference memory store for tests and
//! single-process deployments.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod in_memory_store;
mod traits;

pub use in_memory_store::InMemoryMemoryStore;
pub use traits::{AgentRuntime, MemoryStore, PlatformApi};
