//! The internal post representation.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How an embedded post relates to the post that carries it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreadLinkKind {
    /// The carrying post replies to the embedded one
    #[display("reply")]
    Reply,
    /// The carrying post is a retweet of the embedded one
    #[display("retweet")]
    Retweet,
    /// The carrying post quotes the embedded one
    #[display("quote")]
    Quote,
}

/// An embedded related post (quoted, retweeted, or replied-to content).
///
/// Thread links are snapshots delivered alongside a post; they are not the
/// ancestor chain, which is reconstructed separately by walking reply links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLink {
    /// Relationship to the carrying post
    #[serde(rename = "type")]
    pub kind: ThreadLinkKind,
    /// The embedded post
    #[serde(rename = "tweet")]
    pub post: Post,
}

impl ThreadLink {
    /// Create a link of the given kind.
    pub fn new(kind: ThreadLinkKind, post: Post) -> Self {
        Self { kind, post }
    }
}

/// A post as seen by the agent.
///
/// `id` is the sole identity and cache key. Posts are immutable snapshots:
/// they are created on fetch or publish and never updated in place.
///
/// # Examples
///
/// ```
/// use warbler_core::PostBuilder;
///
/// let post = PostBuilder::default()
///     .id("1001")
///     .conversation_id("1000")
///     .text("hello there")
///     .author_id("42")
///     .in_reply_to_id("1000")
///     .build()
///     .unwrap();
///
/// assert_eq!(post.id(), "1001");
/// assert_eq!(post.in_reply_to_id().as_deref(), Some("1000"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into, strip_option))]
pub struct Post {
    /// Platform-assigned post ID
    #[builder(setter(into))]
    id: String,

    /// ID of the post that started the conversation
    #[builder(setter(into))]
    conversation_id: String,

    /// Post body
    #[builder(setter(into))]
    text: String,

    /// Creation time as reported by the platform (RFC 3339), or fetch time
    #[builder(default)]
    #[serde(default)]
    created_at: String,

    /// Creation time in epoch seconds
    #[builder(default)]
    #[serde(default)]
    timestamp: i64,

    /// Platform user ID of the author
    #[builder(setter(into))]
    #[serde(rename = "userId")]
    author_id: String,

    /// Author handle (without `@`), when the author expansion was present
    #[builder(default)]
    #[serde(default, rename = "username")]
    author_handle: Option<String>,

    /// Author display name
    #[builder(default)]
    #[serde(default, rename = "name")]
    author_name: Option<String>,

    /// ID of the post this one replies to
    #[builder(default)]
    #[serde(default, rename = "inReplyToStatusId")]
    in_reply_to_id: Option<String>,

    /// Public URL of the post
    #[builder(default)]
    #[serde(default)]
    permanent_url: String,

    /// Hashtags, in order of appearance
    #[builder(default)]
    #[serde(default)]
    hashtags: Vec<String>,

    /// Mentioned handles, in order of appearance
    #[builder(default)]
    #[serde(default)]
    mentions: Vec<String>,

    /// Expanded link URLs
    #[builder(default)]
    #[serde(default)]
    urls: Vec<String>,

    /// Photo URLs
    #[builder(default)]
    #[serde(default)]
    photos: Vec<String>,

    /// Video URLs
    #[builder(default)]
    #[serde(default)]
    videos: Vec<String>,

    /// Embedded related posts
    #[builder(default)]
    #[serde(default)]
    thread: Vec<ThreadLink>,
}

impl Post {
    /// Creates a new post builder.
    pub fn builder() -> PostBuilder {
        PostBuilder::default()
    }

    /// Creation time in epoch milliseconds, as stored on memory records.
    pub fn created_at_millis(&self) -> i64 {
        self.timestamp.saturating_mul(1000)
    }

    /// Embedded posts of one relationship kind.
    pub fn links_of(&self, kind: ThreadLinkKind) -> impl Iterator<Item = &Post> {
        self.thread
            .iter()
            .filter(move |link| link.kind == kind)
            .map(|link| &link.post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str) -> Post {
        Post::builder()
            .id(id)
            .conversation_id("1")
            .text("body")
            .author_id("7")
            .timestamp(1_700_000_000)
            .build()
            .unwrap()
    }

    #[test]
    fn millis_scale_seconds() {
        assert_eq!(post("2").created_at_millis(), 1_700_000_000_000);
    }

    #[test]
    fn serializes_with_platform_field_names() {
        let value = serde_json::to_value(post("2")).unwrap();
        assert_eq!(value["userId"], "7");
        assert_eq!(value["conversationId"], "1");
        assert!(value.get("inReplyToStatusId").is_some());
    }

    #[test]
    fn link_kinds_render_lowercase() {
        assert_eq!(ThreadLinkKind::Retweet.to_string(), "retweet");
        assert_eq!(
            serde_json::to_value(ThreadLinkKind::Quote).unwrap(),
            serde_json::json!("quote")
        );
    }

    #[test]
    fn links_filter_by_kind() {
        let mut carrier = post("3");
        carrier.thread = vec![
            ThreadLink::new(ThreadLinkKind::Quote, post("4")),
            ThreadLink::new(ThreadLinkKind::Retweet, post("5")),
        ];
        let quoted: Vec<_> = carrier.links_of(ThreadLinkKind::Quote).collect();
        assert_eq!(quoted.len(), 1);
        assert_eq!(quoted[0].id(), "4");
    }
}
