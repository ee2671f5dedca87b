//! Tests for the post and memory data model.

use warbler_core::{ids, Memory, MemoryContent, Post, ThreadLinkKind, PLATFORM_SOURCE};
use uuid::Uuid;

#[test]
fn test_parses_cached_post_with_embedded_quote() {
    let json = r#"{
        "id": "200",
        "text": "look at this",
        "conversationId": "200",
        "createdAt": "2024-11-15T10:00:00.000Z",
        "userId": "42",
        "permanentUrl": "https://twitter.com/alice/status/200",
        "username": "alice",
        "name": "Alice",
        "hashtags": ["rust"],
        "mentions": [],
        "photos": [],
        "urls": ["https://example.com"],
        "videos": [],
        "timestamp": 1731664800,
        "thread": [
            {
                "type": "quote",
                "tweet": {
                    "id": "150",
                    "text": "original",
                    "conversationId": "150",
                    "userId": "7"
                }
            }
        ]
    }"#;

    let post: Post = serde_json::from_str(json).unwrap();

    assert_eq!(post.id(), "200");
    assert_eq!(post.author_handle().as_deref(), Some("alice"));
    assert!(post.in_reply_to_id().is_none());
    assert_eq!(post.hashtags(), &vec!["rust".to_string()]);
    assert_eq!(post.thread().len(), 1);
    assert_eq!(post.thread()[0].kind, ThreadLinkKind::Quote);
    assert_eq!(post.thread()[0].post.id(), "150");
    // Missing optional fields in embedded posts fall back to defaults
    assert_eq!(*post.thread()[0].post.timestamp(), 0);
}

#[test]
fn test_memory_builder_uses_derived_ids() {
    let agent = Uuid::from_u128(77);
    let memory = Memory::builder()
        .id(ids::memory_id("200", agent))
        .user_id(ids::string_to_uuid("42"))
        .agent_id(agent)
        .room_id(ids::room_id("200", agent))
        .content(MemoryContent {
            text: "look at this".into(),
            url: None,
            source: PLATFORM_SOURCE.into(),
            in_reply_to: None,
        })
        .created_at(1_731_664_800_000_i64)
        .build()
        .unwrap();

    assert_eq!(*memory.id(), ids::memory_id("200", agent));
    assert_eq!(memory.content().source, "twitter");
}
