//! Conversions from v2 wire models to the internal post type.

use super::json_models::{Includes, Media, Tweet};
use warbler_core::{Post, ThreadLink, ThreadLinkKind};
use warbler_error::{PlatformError, PlatformErrorKind, WarblerResult};

/// Public URL of a post. Without a known handle the handle-less status URL is used.
pub fn permanent_url(handle: Option<&str>, id: &str) -> String {
    match handle {
        Some(handle) if !handle.is_empty() => format!("https://twitter.com/{}/status/{}", handle, id),
        _ => format!("https://twitter.com/i/web/status/{}", id),
    }
}

/// Map a tweet and the expansions of its response onto a [`Post`].
///
/// Retweeted and quoted tweets present in `includes.tweets` become thread
/// links. The replied-to parent is recorded only as `in_reply_to_id`.
///
/// # Errors
///
/// Returns `MalformedResponse` if the tweet lacks an ID, text, or author.
#[track_caller]
pub fn tweet_to_post(tweet: &Tweet, includes: &Includes) -> WarblerResult<Post> {
    let mut thread = Vec::new();
    for (ref_type, kind) in [
        ("retweeted", ThreadLinkKind::Retweet),
        ("quoted", ThreadLinkKind::Quote),
    ] {
        let Some(embedded) = tweet.referenced(ref_type).and_then(|id| includes.tweet(id)) else {
            continue;
        };
        match build_post(embedded, includes, Vec::new()) {
            Ok(embedded) => thread.push(ThreadLink::new(kind, embedded)),
            Err(e) => tracing::debug!(error = %e, ref_type, "Skipping unusable embedded tweet"),
        }
    }

    build_post(tweet, includes, thread)
}

#[track_caller]
fn build_post(tweet: &Tweet, includes: &Includes, thread: Vec<ThreadLink>) -> WarblerResult<Post> {
    if tweet.id.is_empty() {
        return Err(malformed("tweet without id".to_string()).into());
    }
    let text = tweet
        .text
        .clone()
        .ok_or_else(|| malformed(format!("tweet {} without text", tweet.id)))?;
    let author_id = tweet
        .author_id
        .clone()
        .ok_or_else(|| malformed(format!("tweet {} without author_id", tweet.id)))?;

    let author = includes.user(&author_id);
    let handle = author.map(|u| u.username.clone());
    let name = author.and_then(|u| u.name.clone());

    let (created_at, timestamp) = creation_time(tweet.created_at.as_deref());
    let entities = tweet.entities.clone().unwrap_or_default();

    let mut photos = Vec::new();
    let mut videos = Vec::new();
    for key in tweet
        .attachments
        .iter()
        .flat_map(|a| a.media_keys.iter())
    {
        let Some(media) = includes.media(key) else {
            continue;
        };
        match media.media_type.as_str() {
            "photo" => photos.extend(media.url.clone()),
            "video" | "animated_gif" => videos.extend(best_video_url(media)),
            _ => {}
        }
    }

    let mut builder = Post::builder();
    builder
        .id(tweet.id.clone())
        .conversation_id(
            tweet
                .conversation_id
                .clone()
                .unwrap_or_else(|| tweet.id.clone()),
        )
        .text(text)
        .created_at(created_at)
        .timestamp(timestamp)
        .author_id(author_id)
        .permanent_url(permanent_url(handle.as_deref(), &tweet.id))
        .hashtags(entities.hashtags.into_iter().map(|h| h.tag).collect::<Vec<_>>())
        .mentions(
            entities
                .mentions
                .into_iter()
                .map(|m| m.username)
                .collect::<Vec<_>>(),
        )
        .urls(
            entities
                .urls
                .into_iter()
                .map(|u| u.expanded_url.unwrap_or(u.url))
                .collect::<Vec<_>>(),
        )
        .photos(photos)
        .videos(videos)
        .thread(thread);

    if let Some(handle) = handle {
        builder.author_handle(handle);
    }
    if let Some(name) = name {
        builder.author_name(name);
    }
    if let Some(parent) = tweet.referenced("replied_to") {
        builder.in_reply_to_id(parent);
    }

    builder.build().map_err(|e| malformed(e.to_string()).into())
}

/// Platform creation time, or the fetch time when absent or unparseable.
fn creation_time(created_at: Option<&str>) -> (String, i64) {
    match created_at.and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok()) {
        Some(parsed) => (parsed.to_rfc3339(), parsed.timestamp()),
        None => {
            let now = chrono::Utc::now();
            (now.to_rfc3339(), now.timestamp())
        }
    }
}

/// Highest bit rate mp4 rendition, falling back to the preview frame.
fn best_video_url(media: &Media) -> Option<String> {
    media
        .variants
        .iter()
        .filter(|v| v.content_type.as_deref() == Some("video/mp4"))
        .max_by_key(|v| v.bit_rate.unwrap_or(0))
        .map(|v| v.url.clone())
        .or_else(|| media.preview_image_url.clone())
}

#[track_caller]
fn malformed(message: String) -> PlatformError {
    PlatformError::new(PlatformErrorKind::MalformedResponse(message))
}
