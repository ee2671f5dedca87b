//! Remote platform error types.

/// How a remote platform call failed.
///
/// The variants map onto the recovery strategies of the client:
/// rate limits are waited out, auth expiry triggers one credential refresh,
/// unavailability is retried with backoff, and malformed responses are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// The platform throttled the request (429-class).
    #[display("Rate limited (reset: {:?})", reset)]
    RateLimited {
        /// Epoch seconds at which the window resets, when reported
        reset: Option<i64>,
    },

    /// Credentials were rejected as expired or invalid.
    #[display("Authentication expired: {}", _0)]
    AuthExpired(String),

    /// The platform is temporarily unable to serve the request.
    #[display("Platform unavailable: {}", _0)]
    Unavailable(String),

    /// The response lacked fields the client requires.
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),

    /// Any other non-success status.
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Error detail reported by the platform
        message: String,
    },
}

impl PlatformErrorKind {
    /// True for expired/invalid credentials.
    ///
    /// An `Api` error counts when its status is 401 or its message mentions a token.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::AuthExpired(_) => true,
            Self::Api { status, message } => {
                *status == 401 || message.to_lowercase().contains("token")
            }
            _ => false,
        }
    }

    /// True if repeating the call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Unavailable(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::AuthExpired(_) | Self::MalformedResponse(_) => false,
        }
    }
}

/// Platform error with location tracking.
///
/// # Examples
///
/// ```
/// use warbler_error::{PlatformError, PlatformErrorKind};
///
/// let err = PlatformError::new(PlatformErrorKind::Unavailable("503".into()));
/// assert!(err.kind().is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    kind: PlatformErrorKind,
    line: u32,
    file: &'static str,
}

impl PlatformError {
    /// Create a new platform error with caller location tracking.
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlatformErrorKind {
        &self.kind
    }
}
