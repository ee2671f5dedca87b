//! Credential storage and auth recovery around single remote calls.

use crate::AuthConfig;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use warbler_core::Credentials;
use warbler_error::{PlatformError, PlatformErrorKind, WarblerResult};
use warbler_interface::PlatformApi;
use warbler_rate_limit::reset_wait;

/// The active credential pair of an account.
///
/// Every request reads the current pair. Only [`AuthRecovery`] replaces it,
/// and refreshes are serialized so concurrent expiries trigger one exchange.
/// Clones share the same pair.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    current: Arc<RwLock<Credentials>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    /// Store holding `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: Arc::new(RwLock::new(credentials)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot of the active pair.
    pub async fn current(&self) -> Credentials {
        self.current.read().await.clone()
    }

    /// The active access token.
    pub async fn access_token(&self) -> String {
        self.current.read().await.access_token().clone()
    }

    /// Replace the active pair.
    pub async fn replace(&self, credentials: Credentials) {
        *self.current.write().await = credentials;
    }
}

/// Retries a single remote call once after auth expiry or rate limiting.
///
/// - Auth expiry: exchange the refresh token for a new pair, store it, and
///   run the call once more. A failed exchange or a second failure propagates.
/// - Rate limit: wait for the reported reset (or the default window) plus a
///   buffer, then run the call once more.
/// - Anything else propagates unchanged.
///
/// This sits inside the request queue, which handles pacing across calls.
#[derive(Clone)]
pub struct AuthRecovery {
    api: Arc<dyn PlatformApi>,
    credentials: CredentialStore,
    config: AuthConfig,
}

impl std::fmt::Debug for AuthRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRecovery")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuthRecovery {
    /// Recovery for calls made with `credentials` against `api`.
    pub fn new(api: Arc<dyn PlatformApi>, credentials: CredentialStore, config: AuthConfig) -> Self {
        Self {
            api,
            credentials,
            config,
        }
    }

    /// The credential store this recovery refreshes.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Run `operation`, recovering once from auth expiry or rate limiting.
    ///
    /// # Errors
    ///
    /// Returns the refresh error if the credential exchange fails, otherwise
    /// the error of the last attempt.
    #[instrument(skip_all)]
    pub async fn execute<F, Fut, T>(&self, operation: F) -> WarblerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = WarblerResult<T>>,
    {
        let used = self.credentials.current().await;

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if error.is_auth_expired() {
            warn!(error = %error, "Credentials rejected, refreshing");
            self.refresh(&used).await?;
            return operation().await;
        }

        if error.is_rate_limited() {
            let now = chrono::Utc::now().timestamp();
            let window = i64::try_from(*self.config.default_window_secs()).unwrap_or(i64::MAX);
            let reset = error
                .rate_limit_reset()
                .unwrap_or_else(|| now.saturating_add(window));
            let wait = reset_wait(reset, now, self.config.reset_buffer());
            warn!(
                reset,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "Rate limited, waiting before one retry"
            );
            tokio::time::sleep(wait).await;
            return operation().await;
        }

        Err(error)
    }

    /// Exchange the refresh token unless another caller already replaced the
    /// pair that was rejected.
    async fn refresh(&self, rejected: &Credentials) -> WarblerResult<()> {
        let _guard = self.credentials.refresh_lock.lock().await;

        let current = self.credentials.current().await;
        if current.access_token() != rejected.access_token() {
            debug!("Credentials already refreshed");
            return Ok(());
        }

        let refresh_token = current.refresh_token().clone().ok_or_else(|| {
            PlatformError::new(PlatformErrorKind::AuthExpired(
                "no refresh token available".to_string(),
            ))
        })?;

        let fresh = self.api.refresh_credentials(&refresh_token).await?;
        // Keep the old refresh token when the exchange does not rotate it
        let fresh = if fresh.refresh_token().is_some() {
            fresh
        } else {
            Credentials::new(fresh.access_token().clone(), Some(refresh_token))
        };
        self.credentials.replace(fresh).await;
        info!("Credentials refreshed");
        Ok(())
    }
}
