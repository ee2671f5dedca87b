//! Client bootstrap, cached fetches, checkpoints and message dedupe.

mod common;

use common::{
    AGENT, OWN_HANDLE, OWN_ID, RecordingRuntime, ScriptedPlatform, collaborators, harness,
    post, settings,
};
use std::sync::Arc;
use warbler_core::{Credentials, MemoryContent, ids};
use warbler_interface::InMemoryMemoryStore;
use warbler_social::{CredentialStore, TwitterClient};

#[tokio::test]
async fn connect_registers_agent_and_ingests_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(ScriptedPlatform::default());
    platform.set_timeline(vec![post("1", "1", "7", None)]);
    let memory = InMemoryMemoryStore::new();
    let runtime = Arc::new(RecordingRuntime::default());
    let credentials = CredentialStore::new(Credentials::new("token", None));

    let client = TwitterClient::connect(
        collaborators(&platform, &memory, &runtime, &credentials),
        settings(&dir),
    )
    .await
    .unwrap();

    assert_eq!(client.profile().id(), OWN_ID);
    assert_eq!(
        runtime.users.lock().unwrap().clone(),
        vec![(AGENT, OWN_HANDLE.to_string())]
    );
    assert_eq!(memory.len().await, 1);
}

#[tokio::test]
async fn connect_rejects_mismatched_username() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(ScriptedPlatform::default());
    let memory = InMemoryMemoryStore::new();
    let runtime = Arc::new(RecordingRuntime::default());
    let credentials = CredentialStore::new(Credentials::new("token", None));
    let mut settings = settings(&dir);
    settings.twitter = settings.twitter.with_username(Some("someone_else".to_string()));

    let result = TwitterClient::connect(
        collaborators(&platform, &memory, &runtime, &credentials),
        settings,
    )
    .await;

    assert!(result.is_err());
    assert!(runtime.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn get_post_prefers_the_cache() {
    let h = harness();
    h.platform.add_post(post("1", "1", "7", None));

    let first = h.client.get_post("1").await.unwrap();
    let second = h.client.get_post("1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.platform.calls("get_post"), 1);
}

#[tokio::test]
async fn missing_post_is_none() {
    let h = harness();
    assert!(h.client.get_post("404").await.unwrap().is_none());
}

#[tokio::test]
async fn search_results_are_cached() {
    let h = harness();
    h.platform.set_mentions(vec![post("3", "2", "7", None)]);

    let found = h
        .client
        .search_posts("@warbler_bot", 20, warbler_core::SearchMode::Latest)
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert!(h.client.get_post("3").await.unwrap().is_some());
    assert_eq!(h.platform.calls("get_post"), 0);
}

#[tokio::test]
async fn request_message_with_same_content_is_saved_once() {
    let h = harness();
    let incoming = post("8", "8", "7", None);
    let memory = h
        .client
        .memory_for(&incoming, h.client.author_user_id(&incoming))
        .unwrap();

    assert!(h.client.save_request_message(memory.clone()).await.unwrap());
    assert!(!h.client.save_request_message(memory).await.unwrap());
    assert_eq!(h.memory.len().await, 1);
}

#[tokio::test]
async fn empty_request_message_is_skipped() {
    let h = harness();
    let incoming = post("8", "8", "7", None);
    let mut memory = h
        .client
        .memory_for(&incoming, h.client.author_user_id(&incoming))
        .unwrap();
    memory = warbler_core::Memory::builder()
        .id(*memory.id())
        .user_id(*memory.user_id())
        .agent_id(*memory.agent_id())
        .room_id(*memory.room_id())
        .content(MemoryContent::default())
        .created_at(*memory.created_at())
        .build()
        .unwrap();

    assert!(!h.client.save_request_message(memory).await.unwrap());
    assert!(h.memory.is_empty().await);
}

#[tokio::test]
async fn checkpoint_only_moves_forward() {
    let h = harness();
    assert_eq!(h.client.last_checked_post_id().await.unwrap(), None);

    assert!(h.client.mark_checked("1000").await.unwrap());
    assert!(!h.client.mark_checked("999").await.unwrap());
    assert!(h.client.mark_checked("1001").await.unwrap());

    assert_eq!(
        h.client.last_checked_post_id().await.unwrap().as_deref(),
        Some("1001")
    );
}

#[tokio::test]
async fn own_posts_map_to_the_agent() {
    let h = harness();
    let own = post("9", "9", OWN_ID, None);
    let other = post("10", "9", "7", None);

    assert_eq!(h.client.author_user_id(&own), AGENT);
    assert_eq!(h.client.author_user_id(&other), ids::string_to_uuid("7"));
}

#[tokio::test]
async fn remembering_twice_creates_one_memory() {
    let h = harness();
    let p = post("9", "9", "7", None);

    assert!(h.client.remember_post(&p).await.unwrap());
    assert!(!h.client.remember_post(&p).await.unwrap());
    assert_eq!(h.memory.len().await, 1);
}
