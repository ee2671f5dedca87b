//! Timeline reconciliation and refresh.

mod common;

use common::{AGENT, harness, post};
use warbler_core::{Post, ids};
use warbler_interface::MemoryStore;

#[tokio::test]
async fn only_unknown_posts_are_ingested() {
    let h = harness();
    let known = post("123", "123", "7", None);
    h.client.remember_post(&known).await.unwrap();

    let created = h
        .client
        .timeline()
        .populate_timeline(&[known, post("124", "124", "8", None)])
        .await
        .unwrap();

    assert_eq!(created, 1);
    assert_eq!(h.memory.len().await, 2);
    assert!(
        h.memory
            .get_memory_by_id(ids::memory_id("124", AGENT))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn duplicates_within_one_batch_are_ingested_once() {
    let h = harness();
    let p = post("5", "5", "7", None);

    let created = h
        .client
        .timeline()
        .populate_timeline(&[p.clone(), p])
        .await
        .unwrap();

    assert_eq!(created, 1);
    assert_eq!(h.memory.len().await, 1);
}

#[tokio::test]
async fn populated_posts_are_cached() {
    let h = harness();

    h.client
        .timeline()
        .populate_timeline(&[post("5", "4", "7", None)])
        .await
        .unwrap();

    assert!(h.dir.path().join("cache/4/5.json").exists());
}

#[tokio::test]
async fn refresh_without_snapshot_fetches_timeline_and_mentions() {
    let h = harness();
    h.platform
        .set_timeline(vec![post("10", "10", "7", None), post("11", "11", "8", None)]);
    h.platform.set_mentions(vec![
        post("11", "11", "8", None),
        post("12", "12", "9", None),
    ]);

    let created = h.client.timeline().refresh_timeline().await.unwrap();

    assert_eq!(created, 3);
    assert_eq!(h.platform.timeline_counts(), vec![50]);
    assert_eq!(h.platform.calls("search_posts"), 1);

    let snapshot = std::fs::read(h.dir.path().join("cache/timeline_cache.json")).unwrap();
    let snapshot: Vec<Post> = serde_json::from_slice(&snapshot).unwrap();
    let snapshot_ids: Vec<&str> = snapshot.iter().map(|p| p.id().as_str()).collect();
    assert_eq!(snapshot_ids, vec!["10", "11"]);
}

#[tokio::test]
async fn overlapping_snapshot_skips_fetch() {
    let h = harness();
    let seen = post("20", "20", "7", None);
    let unseen = post("21", "21", "8", None);
    h.client.remember_post(&seen).await.unwrap();
    std::fs::create_dir_all(h.dir.path().join("cache")).unwrap();
    std::fs::write(
        h.dir.path().join("cache/timeline_cache.json"),
        serde_json::to_vec(&vec![seen, unseen]).unwrap(),
    )
    .unwrap();

    let created = h.client.timeline().refresh_timeline().await.unwrap();

    assert_eq!(created, 1);
    assert_eq!(h.platform.calls("home_timeline"), 0);
    assert_eq!(h.platform.calls("search_posts"), 0);
}

#[tokio::test]
async fn stale_snapshot_fetches_the_short_refresh() {
    let h = harness();
    std::fs::create_dir_all(h.dir.path().join("cache")).unwrap();
    std::fs::write(
        h.dir.path().join("cache/timeline_cache.json"),
        serde_json::to_vec(&vec![post("30", "30", "7", None)]).unwrap(),
    )
    .unwrap();
    h.platform.set_timeline(vec![post("31", "31", "7", None)]);

    let created = h.client.timeline().refresh_timeline().await.unwrap();

    assert_eq!(created, 1);
    assert_eq!(h.platform.timeline_counts(), vec![10]);
}

#[tokio::test]
async fn corrupt_snapshot_is_an_error() {
    let h = harness();
    std::fs::create_dir_all(h.dir.path().join("cache")).unwrap();
    std::fs::write(h.dir.path().join("cache/timeline_cache.json"), b"not json").unwrap();

    assert!(h.client.timeline().refresh_timeline().await.is_err());
}
