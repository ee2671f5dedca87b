//! Scripted collaborators shared by the client integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;
use warbler_core::{Credentials, Post, SearchMode, UserProfile};
use warbler_error::{HttpError, HttpErrorKind, PlatformError, PlatformErrorKind, WarblerResult};
use warbler_interface::{AgentRuntime, InMemoryMemoryStore, PlatformApi};
use warbler_rate_limit::QueueConfig;
use warbler_social::{ClientSettings, Collaborators, CredentialStore, TwitterClient, TwitterConfig};

pub const AGENT: Uuid = Uuid::from_u128(0xA6E7);
pub const OWN_ID: &str = "500";
pub const OWN_HANDLE: &str = "warbler_bot";

/// Build a post with the fields the client cares about.
pub fn post(id: &str, conversation: &str, author: &str, in_reply_to: Option<&str>) -> Post {
    let mut builder = Post::builder();
    builder
        .id(id)
        .conversation_id(conversation)
        .text(format!("text of {}", id))
        .author_id(author)
        .author_handle(format!("user{}", author))
        .timestamp(1_700_000_000)
        .permanent_url(format!("https://twitter.com/user{}/status/{}", author, id));
    if let Some(parent) = in_reply_to {
        builder.in_reply_to_id(parent);
    }
    builder.build().unwrap()
}

/// Platform double serving posts from a map and recording every call.
#[derive(Default)]
pub struct ScriptedPlatform {
    posts: Mutex<HashMap<String, Post>>,
    failures: Mutex<VecDeque<Option<PlatformErrorKind>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    published: Mutex<Vec<(String, Option<String>)>>,
    timeline: Mutex<Vec<Post>>,
    mentions: Mutex<Vec<Post>>,
    timeline_counts: Mutex<Vec<u32>>,
    lost_acks: Mutex<usize>,
}

impl ScriptedPlatform {
    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id().clone(), post);
    }

    /// Script the next call, of any method, to fail with `kind`.
    pub fn fail_next(&self, kind: PlatformErrorKind) {
        self.failures.lock().unwrap().push_back(Some(kind));
    }

    /// Script the next call to succeed; used to interleave failures.
    pub fn succeed_next(&self) {
        self.failures.lock().unwrap().push_back(None);
    }

    /// Script the next publish to store the post and then time out, as if
    /// the response never arrived.
    pub fn lose_next_ack(&self) {
        *self.lost_acks.lock().unwrap() += 1;
    }

    pub fn set_timeline(&self, posts: Vec<Post>) {
        *self.timeline.lock().unwrap() = posts;
    }

    pub fn set_mentions(&self, posts: Vec<Post>) {
        *self.mentions.lock().unwrap() = posts;
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// `(text, parent)` of every published post, in order.
    pub fn published(&self) -> Vec<(String, Option<String>)> {
        self.published.lock().unwrap().clone()
    }

    pub fn timeline_counts(&self) -> Vec<u32> {
        self.timeline_counts.lock().unwrap().clone()
    }

    fn enter(&self, method: &'static str) -> WarblerResult<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        match self.failures.lock().unwrap().pop_front().flatten() {
            Some(kind) => Err(PlatformError::new(kind).into()),
            None => Ok(()),
        }
    }

    fn acknowledge(&self, id: String) -> WarblerResult<String> {
        let mut lost = self.lost_acks.lock().unwrap();
        if *lost > 0 {
            *lost -= 1;
            return Err(HttpError::new(HttpErrorKind::Timeout)
                .at_endpoint("/2/tweets")
                .into());
        }
        Ok(id)
    }

    fn publish(&self, text: &str, parent: Option<&str>) -> String {
        let mut published = self.published.lock().unwrap();
        let id = format!("{}", 9000 + published.len());
        published.push((text.to_string(), parent.map(str::to_string)));

        let mut posts = self.posts.lock().unwrap();
        let conversation = parent
            .and_then(|p| posts.get(p))
            .map(|p| p.conversation_id().clone())
            .unwrap_or_else(|| id.clone());
        let mut builder = Post::builder();
        builder
            .id(id.clone())
            .conversation_id(conversation)
            .text(text)
            .author_id(OWN_ID)
            .author_handle(OWN_HANDLE)
            .timestamp(1_700_000_100)
            .permanent_url(format!("https://twitter.com/{}/status/{}", OWN_HANDLE, id));
        if let Some(parent) = parent {
            builder.in_reply_to_id(parent);
        }
        let created = builder.build().unwrap();
        posts.insert(id.clone(), created);
        id
    }
}

#[async_trait]
impl PlatformApi for ScriptedPlatform {
    async fn current_user(&self) -> WarblerResult<UserProfile> {
        self.enter("current_user")?;
        Ok(UserProfile::new(OWN_ID, OWN_HANDLE, Some("Warbler".to_string())))
    }

    async fn get_post(&self, id: &str) -> WarblerResult<Option<Post>> {
        self.enter("get_post")?;
        Ok(self.posts.lock().unwrap().get(id).cloned())
    }

    async fn search_posts(
        &self,
        _query: &str,
        limit: u32,
        _mode: SearchMode,
    ) -> WarblerResult<Vec<Post>> {
        self.enter("search_posts")?;
        let mentions = self.mentions.lock().unwrap();
        Ok(mentions.iter().take(limit as usize).cloned().collect())
    }

    async fn home_timeline(&self, count: u32) -> WarblerResult<Vec<Post>> {
        self.enter("home_timeline")?;
        self.timeline_counts.lock().unwrap().push(count);
        let timeline = self.timeline.lock().unwrap();
        Ok(timeline.iter().take(count as usize).cloned().collect())
    }

    async fn create_post(&self, text: &str) -> WarblerResult<String> {
        self.enter("create_post")?;
        let id = self.publish(text, None);
        self.acknowledge(id)
    }

    async fn reply_to_post(&self, text: &str, parent_id: &str) -> WarblerResult<String> {
        self.enter("reply_to_post")?;
        let id = self.publish(text, Some(parent_id));
        self.acknowledge(id)
    }

    async fn refresh_credentials(&self, _refresh_token: &str) -> WarblerResult<Credentials> {
        self.enter("refresh_credentials")?;
        Ok(Credentials::new("fresh-token", None))
    }
}

/// Runtime double recording every upsert.
#[derive(Default)]
pub struct RecordingRuntime {
    pub users: Mutex<Vec<(Uuid, String)>>,
    pub connections: Mutex<Vec<(Uuid, Uuid)>>,
    pub rooms: Mutex<Vec<Uuid>>,
    pub participants: Mutex<Vec<(Uuid, Uuid)>>,
}

#[async_trait]
impl AgentRuntime for RecordingRuntime {
    fn agent_id(&self) -> Uuid {
        AGENT
    }

    async fn ensure_user_exists(
        &self,
        user_id: Uuid,
        handle: &str,
        _name: Option<&str>,
        _source: &str,
    ) -> WarblerResult<()> {
        self.users.lock().unwrap().push((user_id, handle.to_string()));
        Ok(())
    }

    async fn ensure_connection(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        _handle: Option<&str>,
        _name: Option<&str>,
        _source: &str,
    ) -> WarblerResult<()> {
        self.connections.lock().unwrap().push((user_id, room_id));
        Ok(())
    }

    async fn ensure_room_exists(&self, room_id: Uuid) -> WarblerResult<()> {
        self.rooms.lock().unwrap().push(room_id);
        Ok(())
    }

    async fn ensure_participant_in_room(&self, user_id: Uuid, room_id: Uuid) -> WarblerResult<()> {
        self.participants.lock().unwrap().push((user_id, room_id));
        Ok(())
    }
}

/// A client wired to scripted collaborators and a temporary cache.
pub struct Harness {
    pub client: TwitterClient,
    pub platform: Arc<ScriptedPlatform>,
    pub memory: InMemoryMemoryStore,
    pub runtime: Arc<RecordingRuntime>,
    pub credentials: CredentialStore,
    pub dir: TempDir,
}

/// Settings with no pacing delay and all files under `dir`.
pub fn settings(dir: &TempDir) -> ClientSettings {
    let queue = QueueConfig::default()
        .with_min_delay_ms(0)
        .with_max_delay_ms(0)
        .with_backoff_base_ms(10);
    let twitter = TwitterConfig::default()
        .with_cache_dir(dir.path().join("cache"))
        .with_timeline_snapshot(dir.path().join("cache").join("timeline_cache.json"));
    ClientSettings {
        queue,
        twitter,
        ..ClientSettings::default()
    }
}

pub fn collaborators(
    platform: &Arc<ScriptedPlatform>,
    memory: &InMemoryMemoryStore,
    runtime: &Arc<RecordingRuntime>,
    credentials: &CredentialStore,
) -> Collaborators {
    Collaborators {
        api: platform.clone(),
        memory: Arc::new(memory.clone()),
        runtime: runtime.clone(),
        credentials: credentials.clone(),
    }
}

pub fn harness() -> Harness {
    harness_with(|settings| settings)
}

pub fn harness_with(adjust: impl FnOnce(ClientSettings) -> ClientSettings) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(ScriptedPlatform::default());
    let memory = InMemoryMemoryStore::new();
    let runtime = Arc::new(RecordingRuntime::default());
    let credentials = CredentialStore::new(Credentials::new(
        "stale-token",
        Some("refresh-1".to_string()),
    ));

    let client = TwitterClient::with_profile(
        collaborators(&platform, &memory, &runtime, &credentials),
        adjust(settings(&dir)),
        UserProfile::new(OWN_ID, OWN_HANDLE, Some("Warbler".to_string())),
    )
    .unwrap();

    Harness {
        client,
        platform,
        memory,
        runtime,
        credentials,
        dir,
    }
}
