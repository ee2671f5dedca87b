//! Core data types for the warbler social agent client.
//!
//! This crate provides the internal post representation, the memory record
//! persisted for each conversation turn, credentials, and the deterministic
//! identifiers that tie posts to memories and rooms.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod credentials;
mod filter;
pub mod ids;
mod memory;
mod post;
mod search;

pub use credentials::{Credentials, UserProfile};
pub use filter::is_valid_post;
pub use memory::{Memory, MemoryBuilder, MemoryContent, PLATFORM_SOURCE};
pub use post::{Post, PostBuilder, ThreadLink, ThreadLinkKind};
pub use search::SearchMode;
