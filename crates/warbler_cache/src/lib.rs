//! Durable storage for fetched posts.
//!
//! [`PostCache`] keeps every post the client has seen in a memory index backed
//! by JSON files laid out as `{base}/{conversationId}/{postId}.json`. A
//! [`Checkpoint`] remembers the newest post ID processed between runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checkpoint;
mod post_cache;

pub use checkpoint::Checkpoint;
pub use post_cache::PostCache;
