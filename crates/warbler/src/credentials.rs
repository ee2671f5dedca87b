//! Account credentials from the environment.

use crate::WarblerConfig;
use tracing::{debug, warn};
use warbler_core::Credentials;
use warbler_error::{ConfigError, ConfigErrorKind, WarblerResult};
use warbler_social::{CredentialStore, TwitterApiClient};

/// Access token variable.
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
/// Refresh token variable.
pub const REFRESH_TOKEN_VAR: &str = "TWITTER_REFRESH_TOKEN";
/// OAuth2 client ID variable.
pub const CLIENT_ID_VAR: &str = "TWITTER_CLIENT_ID";
/// OAuth2 client secret variable.
pub const CLIENT_SECRET_VAR: &str = "TWITTER_CLIENT_SECRET";

/// Credentials and OAuth2 app identity read from the environment.
#[derive(Clone)]
pub struct EnvCredentials {
    credentials: Credentials,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl std::fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentials")
            .field("credentials", &self.credentials)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl EnvCredentials {
    /// Read credentials from the process environment, loading `.env` first
    /// when one exists.
    ///
    /// # Errors
    ///
    /// Returns error if `TWITTER_ACCESS_TOKEN` is unset or empty.
    pub fn from_env() -> WarblerResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => debug!("No .env file"),
            Err(e) => warn!(error = %e, "Failed to load .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is missing or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WarblerResult<Self> {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let access_token = present(ACCESS_TOKEN_VAR)
            .ok_or_else(|| {
                ConfigError::new(ConfigErrorKind::MissingCredential(ACCESS_TOKEN_VAR.to_string()))
            })?;
        let refresh_token = present(REFRESH_TOKEN_VAR);
        if refresh_token.is_none() {
            warn!("{} is not set, expired credentials cannot be refreshed", REFRESH_TOKEN_VAR);
        }

        Ok(Self {
            credentials: Credentials::new(access_token, refresh_token),
            client_id: present(CLIENT_ID_VAR),
            client_secret: present(CLIENT_SECRET_VAR),
        })
    }

    /// The credential pair.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// OAuth2 client ID, if set.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// A credential store seeded with these credentials.
    pub fn store(&self) -> CredentialStore {
        CredentialStore::new(self.credentials.clone())
    }

    /// Build the HTTP platform client for `config`, sharing `store`.
    ///
    /// The OAuth2 client ID comes from the environment, falling back to the
    /// `[auth]` section. Without one the refresh-token exchange is unavailable.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn api_client(
        &self,
        config: &WarblerConfig,
        store: CredentialStore,
    ) -> WarblerResult<TwitterApiClient> {
        let client = TwitterApiClient::new(config.twitter(), store)?;
        let client_id = self
            .client_id
            .clone()
            .or_else(|| config.auth().client_id().clone());

        Ok(match client_id {
            Some(id) => client.with_oauth_app(id, self.client_secret.clone()),
            None => client,
        })
    }
}
