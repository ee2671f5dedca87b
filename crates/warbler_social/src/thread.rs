//! Reply-chain reconstruction.

use crate::TwitterClient;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use warbler_core::Post;
use warbler_error::WarblerResult;

/// Walks a reply chain from a leaf toward its root, persisting a memory for
/// every post on the way.
///
/// The walk ends at a post without a parent, at a parent that cannot be
/// fetched, or at a post already visited during the same call. Each call owns
/// its visited set, so a malformed chain that loops back on itself still
/// terminates. Parents are looked up through the client, which serves cached
/// posts locally and fetches the rest through the request queue.
#[derive(Debug, Clone, Copy)]
pub struct ThreadBuilder<'a> {
    client: &'a TwitterClient,
}

impl<'a> ThreadBuilder<'a> {
    /// Builder for threads seen by `client`.
    pub fn new(client: &'a TwitterClient) -> Self {
        Self { client }
    }

    /// Record the chain ending at `leaf` and return it ordered root first.
    ///
    /// # Errors
    ///
    /// Returns error if linking an author or persisting a memory fails.
    /// Failing to fetch a parent only truncates the chain.
    #[instrument(skip(self, leaf), fields(leaf_id = %leaf.id()))]
    pub async fn build_thread(&self, leaf: &Post) -> WarblerResult<Vec<Post>> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut chain = Vec::new();
        let mut next = Some(leaf.clone());

        while let Some(post) = next.take() {
            if !visited.insert(post.id().clone()) {
                warn!(post_id = %post.id(), "Reply chain loops back, stopping");
                break;
            }

            self.client.cache().put(&post).await?;
            let created = self.client.remember_post(&post).await?;
            debug!(post_id = %post.id(), created, depth = chain.len(), "Visited post");

            if let Some(parent_id) = post.in_reply_to_id() {
                match self.client.get_post(parent_id).await {
                    Ok(Some(parent)) => next = Some(parent),
                    Ok(None) => debug!(parent_id = %parent_id, "Parent not found, chain truncated"),
                    Err(e) => warn!(parent_id = %parent_id, error = %e, "Parent fetch failed, chain truncated"),
                }
            }

            chain.push(post);
        }

        chain.reverse();
        debug!(length = chain.len(), "Thread built");
        Ok(chain)
    }
}
