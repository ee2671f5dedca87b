//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, HttpError, HttpErrorKind, JsonError, MemoryError, PlatformError,
    PlatformErrorKind, StorageError,
};

/// Every error condition a warbler operation can surface.
///
/// # Examples
///
/// ```
/// use warbler_error::{WarblerError, HttpError, HttpErrorKind};
///
/// let http_err = HttpError::new(HttpErrorKind::Transport("connection reset".into()));
/// let err: WarblerError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum WarblerErrorKind {
    /// Transport-level HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Post cache storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Remote platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Memory store error
    #[from(MemoryError)]
    Memory(MemoryError),
}

/// Warbler error with kind discrimination.
///
/// # Examples
///
/// ```
/// use warbler_error::{WarblerResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> WarblerResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Invalid("missing [twitter] section".into())))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Warbler Error: {}", _0)]
pub struct WarblerError(Box<WarblerErrorKind>);

impl WarblerError {
    /// Create a new error from a kind.
    pub fn new(kind: WarblerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WarblerErrorKind {
        &self.0
    }

    /// The platform classification, if this is a remote platform error.
    pub fn platform_kind(&self) -> Option<&PlatformErrorKind> {
        match self.kind() {
            WarblerErrorKind::Platform(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// True if the platform rejected the call because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.platform_kind(),
            Some(PlatformErrorKind::RateLimited { .. })
        )
    }

    /// Reported reset time (epoch seconds) of a rate-limit error.
    ///
    /// Returns `None` both for non-rate-limit errors and for rate limits that
    /// carried no reset time.
    pub fn rate_limit_reset(&self) -> Option<i64> {
        match self.platform_kind() {
            Some(PlatformErrorKind::RateLimited { reset }) => *reset,
            _ => None,
        }
    }

    /// True if the failure signals expired or invalid credentials.
    pub fn is_auth_expired(&self) -> bool {
        self.platform_kind()
            .is_some_and(PlatformErrorKind::is_auth_expired)
    }

    /// True if repeating the identical call may succeed.
    ///
    /// Transport failures and platform unavailability are retryable.
    /// Malformed responses, auth failures, configuration and local storage
    /// errors are not.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            WarblerErrorKind::Http(e) => e.is_transient(),
            WarblerErrorKind::Platform(e) => e.kind().is_retryable(),
            _ => false,
        }
    }

    /// True if the request may have reached the platform before failing.
    ///
    /// A timeout or dropped connection leaves the outcome unknown, while a
    /// status the platform returned proves the request was not applied.
    /// Writes are only repeated when this is false.
    pub fn is_delivery_uncertain(&self) -> bool {
        match self.kind() {
            WarblerErrorKind::Http(e) => matches!(
                e.kind(),
                HttpErrorKind::Timeout | HttpErrorKind::Transport(_)
            ),
            _ => false,
        }
    }
}

impl<T> From<T> for WarblerError
where
    T: Into<WarblerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for warbler operations.
///
/// # Examples
///
/// ```
/// use warbler_error::{WarblerResult, HttpError, HttpErrorKind};
///
/// fn fetch_data() -> WarblerResult<String> {
///     Err(HttpError::new(HttpErrorKind::Timeout))?
/// }
/// ```
pub type WarblerResult<T> = std::result::Result<T, WarblerError>;
