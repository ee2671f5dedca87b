//! Twitter v2 REST client.

use super::conversions::tweet_to_post;
use super::json_models::{
    CreateTweetRequest, CreatedTweet, ErrorBody, Tweet, TokenResponse, TwitterResponse, User,
};
use crate::{CredentialStore, TwitterConfig};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use warbler_core::{Credentials, Post, SearchMode, UserProfile};
use warbler_error::{
    HttpError, HttpErrorKind, PlatformError, PlatformErrorKind, WarblerError, WarblerResult,
};
use warbler_interface::PlatformApi;
use warbler_rate_limit::RateLimitTracker;

const TWEET_FIELDS: &str =
    "id,text,author_id,created_at,conversation_id,referenced_tweets,entities,attachments";
const EXPANSIONS: &str = "author_id,referenced_tweets.id,referenced_tweets.id.author_id,attachments.media_keys";
const USER_FIELDS: &str = "id,name,username";
const MEDIA_FIELDS: &str = "media_key,type,url,preview_image_url,variants";

/// OAuth2 application used for the refresh-token exchange.
#[derive(Clone)]
struct OAuthApp {
    client_id: String,
    client_secret: Option<String>,
}

/// HTTP implementation of [`PlatformApi`] against the Twitter v2 API.
///
/// Every request carries the current access token of the shared
/// [`CredentialStore`] as a bearer token, so a refresh performed by auth
/// recovery takes effect on the next request.
///
/// Responses are classified for the recovery layers: 429 becomes
/// `RateLimited` with the `x-rate-limit-reset` time, 401 becomes
/// `AuthExpired`, 5xx stays a retryable `Api` error, and bodies that do not
/// parse become `MalformedResponse`.
pub struct TwitterApiClient {
    client: Client,
    base_url: String,
    credentials: CredentialStore,
    oauth: Option<OAuthApp>,
    rate_limits: RateLimitTracker,
    own_id: OnceCell<String>,
}

impl std::fmt::Debug for TwitterApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApiClient")
            .field("base_url", &self.base_url)
            .field("oauth_configured", &self.oauth.is_some())
            .finish_non_exhaustive()
    }
}

impl TwitterApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &TwitterConfig, credentials: CredentialStore) -> WarblerResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("warbler/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::new(HttpErrorKind::ClientSetup(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.api_url().trim_end_matches('/').to_string(),
            credentials,
            oauth: None,
            rate_limits: RateLimitTracker::new(),
            own_id: OnceCell::new(),
        })
    }

    /// Enable the refresh-token exchange with an OAuth2 client ID and,
    /// for confidential clients, its secret.
    pub fn with_oauth_app(mut self, client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        self.oauth = Some(OAuthApp {
            client_id: client_id.into(),
            client_secret,
        });
        self
    }

    /// Rate-limit headers of the most recent response.
    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.rate_limits
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> WarblerResult<T> {
        let request = self.client.get(self.url(endpoint)).query(params);
        self.send(request).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> WarblerResult<T> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> WarblerResult<T> {
        let token = self.credentials.access_token().await;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> WarblerResult<T> {
        let status = response.status();
        let limits = self.rate_limits.observe(response.headers()).await;

        if status == StatusCode::TOO_MANY_REQUESTS {
            debug!(reset = ?limits.reset, "Rate limited by platform");
            return Err(PlatformError::new(PlatformErrorKind::RateLimited {
                reset: limits.reset,
            })
            .into());
        }

        let endpoint = response.url().path().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e).at_endpoint(endpoint))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| {
                PlatformError::new(PlatformErrorKind::MalformedResponse(e.to_string())).into()
            });
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());

        Err(classify_status(status, message).into())
    }

    async fn own_id(&self) -> WarblerResult<&String> {
        self.own_id
            .get_or_try_init(|| async { self.current_user().await.map(|u| u.id().clone()) })
            .await
    }

    fn posts_from(response: TwitterResponse<Vec<Tweet>>) -> WarblerResult<Vec<Post>> {
        response
            .data
            .unwrap_or_default()
            .iter()
            .map(|tweet| tweet_to_post(tweet, &response.includes))
            .collect()
    }
}

/// Request that never produced a status.
#[track_caller]
fn transport_error(error: reqwest::Error) -> HttpError {
    let kind = if error.is_timeout() {
        HttpErrorKind::Timeout
    } else {
        HttpErrorKind::Transport(error.to_string())
    };
    let http = HttpError::new(kind);
    match error.url() {
        Some(url) => http.at_endpoint(url.path()),
        None => http,
    }
}

/// Map a non-success, non-429 status onto the platform error taxonomy.
fn classify_status(status: StatusCode, message: String) -> PlatformError {
    let kind = match status {
        StatusCode::UNAUTHORIZED => PlatformErrorKind::AuthExpired(message),
        StatusCode::SERVICE_UNAVAILABLE => PlatformErrorKind::Unavailable(message),
        _ => PlatformErrorKind::Api {
            status: status.as_u16(),
            message,
        },
    };
    PlatformError::new(kind)
}

fn is_not_found(error: &WarblerError) -> bool {
    matches!(
        error.platform_kind(),
        Some(PlatformErrorKind::Api { status: 404, .. })
    )
}

fn lookup_params() -> Vec<(&'static str, String)> {
    vec![
        ("tweet.fields", TWEET_FIELDS.to_string()),
        ("expansions", EXPANSIONS.to_string()),
        ("user.fields", USER_FIELDS.to_string()),
        ("media.fields", MEDIA_FIELDS.to_string()),
    ]
}

#[async_trait]
impl PlatformApi for TwitterApiClient {
    #[instrument(skip(self))]
    async fn current_user(&self) -> WarblerResult<UserProfile> {
        let response: TwitterResponse<User> = self
            .get("/2/users/me", &[("user.fields", USER_FIELDS.to_string())])
            .await?;
        let user = response.data.ok_or_else(|| {
            PlatformError::new(PlatformErrorKind::MalformedResponse(
                "users/me returned no data".to_string(),
            ))
        })?;
        Ok(UserProfile::new(user.id, user.username, user.name))
    }

    #[instrument(skip(self))]
    async fn get_post(&self, id: &str) -> WarblerResult<Option<Post>> {
        let response: TwitterResponse<Tweet> =
            match self.get(&format!("/2/tweets/{}", id), &lookup_params()).await {
                Ok(response) => response,
                Err(e) if is_not_found(&e) => return Ok(None),
                Err(e) => return Err(e),
            };

        match response.data {
            Some(tweet) => tweet_to_post(&tweet, &response.includes).map(Some),
            None if response.errors.iter().any(|e| e.is_not_found()) => Ok(None),
            None => {
                let detail = response
                    .errors
                    .first()
                    .map(|e| e.message())
                    .unwrap_or_else(|| "tweet lookup returned no data".to_string());
                Err(PlatformError::new(PlatformErrorKind::MalformedResponse(detail)).into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn search_posts(
        &self,
        query: &str,
        limit: u32,
        mode: SearchMode,
    ) -> WarblerResult<Vec<Post>> {
        let mut params = lookup_params();
        params.push(("query", query.to_string()));
        // The endpoint accepts 10..=100
        params.push(("max_results", limit.clamp(10, 100).to_string()));
        params.push(("sort_order", mode.sort_order().to_string()));

        let response: TwitterResponse<Vec<Tweet>> =
            self.get("/2/tweets/search/recent", &params).await?;
        let mut posts = Self::posts_from(response)?;
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(posts)
    }

    #[instrument(skip(self))]
    async fn home_timeline(&self, count: u32) -> WarblerResult<Vec<Post>> {
        let own_id = self.own_id().await?.clone();
        let mut params = lookup_params();
        params.push(("max_results", count.clamp(1, 100).to_string()));

        let response: TwitterResponse<Vec<Tweet>> = self
            .get(
                &format!("/2/users/{}/timelines/reverse_chronological", own_id),
                &params,
            )
            .await?;
        Self::posts_from(response)
    }

    #[instrument(skip(self, text), fields(len = text.chars().count()))]
    async fn create_post(&self, text: &str) -> WarblerResult<String> {
        let response: TwitterResponse<CreatedTweet> = self
            .post_json("/2/tweets", &CreateTweetRequest::new(text))
            .await?;
        created_id(response)
    }

    #[instrument(skip(self, text), fields(len = text.chars().count()))]
    async fn reply_to_post(&self, text: &str, parent_id: &str) -> WarblerResult<String> {
        let response: TwitterResponse<CreatedTweet> = self
            .post_json("/2/tweets", &CreateTweetRequest::reply(text, parent_id))
            .await?;
        created_id(response)
    }

    #[instrument(skip_all)]
    async fn refresh_credentials(&self, refresh_token: &str) -> WarblerResult<Credentials> {
        let oauth = self.oauth.as_ref().ok_or_else(|| {
            PlatformError::new(PlatformErrorKind::AuthExpired(
                "no OAuth client configured for token refresh".to_string(),
            ))
        })?;

        let mut request = self.client.post(self.url("/2/oauth2/token")).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", oauth.client_id.as_str()),
        ]);
        if let Some(secret) = &oauth.client_secret {
            request = request.basic_auth(&oauth.client_id, Some(secret));
        }

        let response = request.send().await.map_err(transport_error)?;
        let token: TokenResponse = self.handle_response(response).await?;
        debug!(expires_in = ?token.expires_in, "Refreshed access token");

        Ok(Credentials::new(token.access_token, token.refresh_token))
    }
}

fn created_id(response: TwitterResponse<CreatedTweet>) -> WarblerResult<String> {
    response.data.map(|created| created.id).ok_or_else(|| {
        PlatformError::new(PlatformErrorKind::MalformedResponse(
            "create tweet returned no data".to_string(),
        ))
        .into()
    })
}
