//! Account-level configuration for the Twitter client.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Auth recovery parameters.
///
/// # Example
///
/// ```toml
/// [auth]
/// default_window_secs = 900
/// reset_buffer_ms = 1000
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct AuthConfig {
    /// Wait assumed when a rate-limit response carries no reset time (s)
    #[serde(default = "default_window_secs")]
    #[builder(default = "default_window_secs()")]
    default_window_secs: u64,

    /// Added to every rate-limit wait (ms)
    #[serde(default = "default_reset_buffer_ms")]
    #[builder(default = "default_reset_buffer_ms()")]
    reset_buffer_ms: u64,

    /// OAuth2 client ID used for the refresh-token exchange
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    client_id: Option<String>,
}

fn default_window_secs() -> u64 {
    900
}

fn default_reset_buffer_ms() -> u64 {
    1000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_window_secs: default_window_secs(),
            reset_buffer_ms: default_reset_buffer_ms(),
            client_id: None,
        }
    }
}

impl AuthConfig {
    /// Reset buffer as a duration.
    pub fn reset_buffer(&self) -> Duration {
        Duration::from_millis(self.reset_buffer_ms)
    }
}

/// Twitter account settings.
///
/// # Example
///
/// ```toml
/// [twitter]
/// api_url = "https://api.twitter.com"
/// username = "warbler_bot"
/// dry_run = false
/// cache_dir = "tweetcache"
/// max_post_length = 240
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct TwitterConfig {
    /// Base URL of the v2 API
    #[serde(default = "default_api_url")]
    #[builder(default = "default_api_url()")]
    api_url: String,

    /// Expected handle of the account, checked against the authenticated user
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    username: Option<String>,

    /// Log intended posts instead of publishing them
    #[serde(default)]
    #[builder(default)]
    dry_run: bool,

    /// Root of the post cache
    #[serde(default = "default_cache_dir")]
    #[builder(default = "default_cache_dir()")]
    cache_dir: PathBuf,

    /// Snapshot of the last fetched home timeline
    #[serde(default = "default_timeline_snapshot")]
    #[builder(default = "default_timeline_snapshot()")]
    timeline_snapshot: PathBuf,

    /// Character budget of one post
    #[serde(default = "default_max_post_length")]
    #[builder(default = "default_max_post_length()")]
    max_post_length: usize,

    /// Mentions fetched on timeline refresh
    #[serde(default = "default_mentions_count")]
    #[builder(default = "default_mentions_count()")]
    mentions_count: u32,

    /// Home timeline posts fetched without a prior snapshot
    #[serde(default = "default_timeline_count")]
    #[builder(default = "default_timeline_count()")]
    timeline_count: u32,

    /// Home timeline posts fetched when a prior snapshot exists
    #[serde(default = "default_timeline_refresh_count")]
    #[builder(default = "default_timeline_refresh_count()")]
    timeline_refresh_count: u32,

    /// HTTP request timeout (s)
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("tweetcache")
}

fn default_timeline_snapshot() -> PathBuf {
    PathBuf::from("tweetcache/timeline_cache.json")
}

fn default_max_post_length() -> usize {
    240
}

fn default_mentions_count() -> u32 {
    20
}

fn default_timeline_count() -> u32 {
    50
}

fn default_timeline_refresh_count() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            username: None,
            dry_run: false,
            cache_dir: default_cache_dir(),
            timeline_snapshot: default_timeline_snapshot(),
            max_post_length: default_max_post_length(),
            mentions_count: default_mentions_count(),
            timeline_count: default_timeline_count(),
            timeline_refresh_count: default_timeline_refresh_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TwitterConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// File holding the last checked post ID.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.cache_dir.join("latest_checked_post_id.txt")
    }
}
