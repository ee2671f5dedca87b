//! Chunked publishing of posts and reply chains.

use crate::{TwitterClient, twitter::permanent_url};
use tracing::{error, info, instrument, warn};
use warbler_core::{Memory, Post};
use warbler_error::{BuilderError, WarblerResult};

/// Split `content` into chunks of at most `max_len` characters, breaking only
/// between words.
///
/// Words are separated by spaces. Literal `\n` escape sequences become line
/// breaks and every chunk is trimmed. A single word longer than `max_len`
/// becomes a chunk of its own rather than being cut. Empty chunks are never
/// produced.
///
/// # Examples
///
/// ```
/// use warbler_social::split_content;
///
/// let chunks = split_content("one two three four", 9);
/// assert_eq!(chunks, vec!["one two", "three", "four"]);
/// ```
pub fn split_content(content: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in content.split(' ').filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_len {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.replace("\\n", "\n").trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Publishes content as one post or a chain of replies.
#[derive(Debug, Clone, Copy)]
pub struct Publisher<'a> {
    client: &'a TwitterClient,
}

impl<'a> Publisher<'a> {
    /// Publisher for the account of `client`.
    pub fn new(client: &'a TwitterClient) -> Self {
        Self { client }
    }

    /// Publish `content`, split into chunks that each reply to the previous
    /// one. The first chunk replies to `reply_to` when given.
    ///
    /// Every chunk goes through the request queue. A chunk that may have
    /// reached the platform before failing is not sent again. In dry-run mode
    /// the chunks are logged and nothing is published.
    ///
    /// # Errors
    ///
    /// A failed chunk aborts the rest. Chunks published before the failure
    /// stay public.
    #[instrument(skip(self, content), fields(len = content.chars().count()))]
    pub async fn publish(&self, content: &str, reply_to: Option<&str>) -> WarblerResult<Vec<Post>> {
        let chunks = split_content(content, *self.client.config().max_post_length());

        if *self.client.config().dry_run() {
            for (index, chunk) in chunks.iter().enumerate() {
                info!(index, reply_to = ?reply_to, chunk = %chunk, "Dry run, not publishing");
            }
            return Ok(Vec::new());
        }

        let mut parent = reply_to.map(str::to_string);
        let mut published: Vec<Post> = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.into_iter().enumerate() {
            let text = chunk.clone();
            let target = parent.clone();
            let id = self
                .client
                .dispatch_write(move |api| {
                    let text = text.clone();
                    let target = target.clone();
                    async move {
                        match target {
                            Some(parent_id) => api.reply_to_post(&text, &parent_id).await,
                            None => api.create_post(&text).await,
                        }
                    }
                })
                .await
                .inspect_err(|e| {
                    error!(index, published = published.len(), error = %e, "Chunk failed, aborting");
                })?;

            let post = match self.client.get_post(&id).await {
                Ok(Some(post)) => post,
                Ok(None) => self.local_post(&id, &chunk, parent.as_deref(), published.first())?,
                Err(e) => {
                    warn!(post_id = %id, error = %e, "Could not fetch published post");
                    self.local_post(&id, &chunk, parent.as_deref(), published.first())?
                }
            };

            info!(post_id = %post.id(), index, "Published");
            parent = Some(post.id().clone());
            published.push(post);
        }

        Ok(published)
    }

    /// Memory records for posts the agent published.
    ///
    /// # Errors
    ///
    /// Returns error if a record cannot be built.
    pub fn memories_for(&self, posts: &[Post]) -> WarblerResult<Vec<Memory>> {
        let agent_id = self.client.agent_id();
        posts
            .iter()
            .map(|post| self.client.memory_for(post, agent_id))
            .collect()
    }

    /// Publish `content` and persist a memory for every resulting post.
    ///
    /// Each post's room is created and the agent joined to it before the
    /// memory is written. Published posts are cached.
    ///
    /// # Errors
    ///
    /// Returns error if publishing, room bookkeeping, caching or persistence
    /// fails.
    #[instrument(skip(self, content))]
    pub async fn publish_and_remember(
        &self,
        content: &str,
        reply_to: Option<&str>,
    ) -> WarblerResult<Vec<Memory>> {
        let posts = self.publish(content, reply_to).await?;
        let memories = self.memories_for(&posts)?;
        let agent_id = self.client.agent_id();

        for (post, memory) in posts.iter().zip(&memories) {
            let room_id = *memory.room_id();
            self.client.runtime().ensure_room_exists(room_id).await?;
            self.client
                .runtime()
                .ensure_participant_in_room(agent_id, room_id)
                .await?;
            self.client.cache().put(post).await?;
            self.client.memory().create_memory(memory.clone()).await?;
        }

        info!(count = memories.len(), "Published posts remembered");
        Ok(memories)
    }

    /// Post reconstructed from what was sent, for when the platform does not
    /// return the created post.
    fn local_post(
        &self,
        id: &str,
        text: &str,
        parent: Option<&str>,
        first: Option<&Post>,
    ) -> WarblerResult<Post> {
        let profile = self.client.profile();
        let now = chrono::Utc::now();
        let conversation = first
            .map(|p| p.conversation_id().clone())
            .unwrap_or_else(|| id.to_string());

        let mut builder = Post::builder();
        builder
            .id(id)
            .conversation_id(conversation)
            .text(text)
            .created_at(now.to_rfc3339())
            .timestamp(now.timestamp())
            .author_id(profile.id().clone())
            .author_handle(profile.handle().clone())
            .permanent_url(permanent_url(Some(profile.handle()), id));
        if let Some(name) = profile.name() {
            builder.author_name(name.clone());
        }
        if let Some(parent) = parent {
            builder.in_reply_to_id(parent);
        }
        builder
            .build()
            .map_err(|e| BuilderError::incomplete("Post", e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_one_chunk() {
        assert_eq!(split_content("hello world", 240), vec!["hello world"]);
    }

    #[test]
    fn chunks_respect_budget_and_word_boundaries() {
        let words: Vec<String> = (0..100).map(|i| format!("word{}", i)).collect();
        let content = words.join(" ");
        let chunks = split_content(&content, 240);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 240);
        }
        assert_eq!(chunks.join(" "), content);
    }

    #[test]
    fn oversized_word_stands_alone() {
        let long = "x".repeat(300);
        let chunks = split_content(&format!("a {} b", long), 240);
        assert_eq!(chunks, vec!["a".to_string(), long, "b".to_string()]);
    }

    #[test]
    fn escaped_newlines_become_line_breaks() {
        assert_eq!(split_content("line one\\nline two", 240), vec!["line one\nline two"]);
    }

    #[test]
    fn blank_content_yields_nothing() {
        assert!(split_content("   ", 240).is_empty());
        assert!(split_content("", 240).is_empty());
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        let content = "é".repeat(120) + " " + &"é".repeat(119);
        assert_eq!(split_content(&content, 240).len(), 1);
    }
}
