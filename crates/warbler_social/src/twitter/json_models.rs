//! Wire models of the Twitter v2 API.
//!
//! Only the fields the client maps onto [`Post`](warbler_core::Post) are
//! modelled; everything else in a response is ignored.

use serde::{Deserialize, Serialize};

/// Standard v2 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterResponse<T> {
    /// Primary payload
    pub data: Option<T>,
    /// Expanded objects referenced by the payload
    #[serde(default)]
    pub includes: Includes,
    /// Partial errors reported alongside (or instead of) data
    #[serde(default)]
    pub errors: Vec<TwitterApiError>,
}

/// Expansions attached to a response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    /// Users referenced by `author_id`
    #[serde(default)]
    pub users: Vec<User>,
    /// Tweets referenced by `referenced_tweets.id`
    #[serde(default)]
    pub tweets: Vec<Tweet>,
    /// Media referenced by `attachments.media_keys`
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Includes {
    /// Expanded user with `id`.
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Expanded tweet with `id`.
    pub fn tweet(&self, id: &str) -> Option<&Tweet> {
        self.tweets.iter().find(|t| t.id == id)
    }

    /// Expanded media with `key`.
    pub fn media(&self, key: &str) -> Option<&Media> {
        self.media.iter().find(|m| m.media_key == key)
    }
}

/// Error object inside a response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitterApiError {
    /// Short error title
    #[serde(default)]
    pub title: Option<String>,
    /// Human readable detail
    #[serde(default)]
    pub detail: Option<String>,
    /// Error type URI
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    /// Status code echoed in the body, when present
    #[serde(default)]
    pub status: Option<u16>,
}

impl TwitterApiError {
    /// Best available description.
    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    /// True for "resource not found" partial errors.
    pub fn is_not_found(&self) -> bool {
        self.title.as_deref() == Some("Not Found Error")
            || self
                .error_type
                .as_deref()
                .is_some_and(|t| t.ends_with("/resource-not-found"))
    }
}

/// A tweet object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tweet {
    /// Tweet ID
    #[serde(default)]
    pub id: String,
    /// Tweet text
    #[serde(default)]
    pub text: Option<String>,
    /// Author user ID
    #[serde(default)]
    pub author_id: Option<String>,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: Option<String>,
    /// ID of the conversation root
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Replied-to, quoted and retweeted tweets
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
    /// Attached media
    #[serde(default)]
    pub attachments: Option<Attachments>,
    /// Parsed entities
    #[serde(default)]
    pub entities: Option<Entities>,
}

impl Tweet {
    /// ID of the referenced tweet of one relationship type.
    pub fn referenced(&self, ref_type: &str) -> Option<&str> {
        self.referenced_tweets
            .iter()
            .find(|r| r.ref_type == ref_type)
            .map(|r| r.id.as_str())
    }
}

/// Relationship to another tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferencedTweet {
    /// `replied_to`, `quoted` or `retweeted`
    #[serde(rename = "type")]
    pub ref_type: String,
    /// ID of the referenced tweet
    pub id: String,
}

/// Media attachment keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attachments {
    /// Keys into `includes.media`
    #[serde(default)]
    pub media_keys: Vec<String>,
}

/// Entities parsed out of the tweet text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    /// Hashtags
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    /// Mentioned users
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Links
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

/// Hashtag entity.
#[derive(Debug, Clone, Deserialize)]
pub struct Hashtag {
    /// Tag without the `#`
    pub tag: String,
}

/// Mention entity.
#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    /// Handle without the `@`
    pub username: String,
}

/// Link entity.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    /// Shortened URL as it appears in the text
    pub url: String,
    /// Original URL
    #[serde(default)]
    pub expanded_url: Option<String>,
}

/// A user object.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Handle without the `@`
    pub username: String,
}

/// A media object.
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    /// Media key referenced by attachments
    pub media_key: String,
    /// `photo`, `video` or `animated_gif`
    #[serde(rename = "type")]
    pub media_type: String,
    /// Direct URL (photos)
    #[serde(default)]
    pub url: Option<String>,
    /// Still frame URL (videos)
    #[serde(default)]
    pub preview_image_url: Option<String>,
    /// Encoded renditions (videos)
    #[serde(default)]
    pub variants: Vec<MediaVariant>,
}

/// One rendition of a video.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaVariant {
    /// Rendition URL
    pub url: String,
    /// MIME type
    #[serde(default)]
    pub content_type: Option<String>,
    /// Bit rate, absent for playlists
    #[serde(default)]
    pub bit_rate: Option<u64>,
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTweetRequest {
    /// Tweet text
    pub text: String,
    /// Reply target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyTarget>,
}

impl CreateTweetRequest {
    /// A top-level tweet.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: None,
        }
    }

    /// A reply to `parent_id`.
    pub fn reply(text: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: Some(ReplyTarget {
                in_reply_to_tweet_id: parent_id.into(),
            }),
        }
    }
}

/// Reply target of a created tweet.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyTarget {
    /// Parent tweet ID
    pub in_reply_to_tweet_id: String,
}

/// Payload of a successful `POST /2/tweets`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTweet {
    /// ID of the new tweet
    pub id: String,
    /// Text as stored by the platform
    #[serde(default)]
    pub text: Option<String>,
}

/// Response of the OAuth2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// New access token
    pub access_token: String,
    /// Rotated refresh token, if issued
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime (s)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Short title
    #[serde(default)]
    pub title: Option<String>,
    /// Detail
    #[serde(default)]
    pub detail: Option<String>,
    /// Nested errors
    #[serde(default)]
    pub errors: Vec<TwitterApiError>,
    /// OAuth-style error code
    #[serde(default)]
    pub error: Option<String>,
    /// OAuth-style error description
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    /// Best available description.
    pub fn message(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.title.clone())
            .or_else(|| self.error.clone())
            .or_else(|| self.errors.first().map(TwitterApiError::message))
    }
}
