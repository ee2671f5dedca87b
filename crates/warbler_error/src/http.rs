//! Transport-level HTTP errors.

/// Where an HTTP exchange broke down before a status could be classified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpErrorKind {
    /// The HTTP client itself could not be constructed.
    #[display("client setup failed: {}", _0)]
    ClientSetup(String),
    /// The request did not complete within the configured timeout.
    #[display("request timed out")]
    Timeout,
    /// Connection, TLS or protocol failure while sending or receiving.
    #[display("transport failed: {}", _0)]
    Transport(String),
}

/// HTTP error with the endpoint it concerned and source location.
///
/// # Examples
///
/// ```
/// use warbler_error::{HttpError, HttpErrorKind};
///
/// let err = HttpError::new(HttpErrorKind::Timeout).at_endpoint("/2/tweets");
/// assert!(err.is_transient());
/// assert!(format!("{}", err).contains("/2/tweets"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} ({}) at line {} in {}", kind, endpoint.as_deref().unwrap_or("-"), line, file)]
pub struct HttpError {
    kind: HttpErrorKind,
    endpoint: Option<String>,
    line: u32,
    file: &'static str,
}

impl HttpError {
    /// Create an error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            endpoint: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Record the endpoint the request targeted.
    pub fn at_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The failure kind.
    pub fn kind(&self) -> &HttpErrorKind {
        &self.kind
    }

    /// The endpoint the request targeted, when recorded.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// True if sending the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, HttpErrorKind::ClientSetup(_))
    }
}
