//! Configuration error types.

/// What was wrong with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required credential variable is unset or empty.
    #[display("{} is not set", _0)]
    MissingCredential(String),
    /// A configuration source could not be read or parsed.
    #[display("invalid configuration: {}", _0)]
    Invalid(String),
    /// The credentials belong to a different account than configured.
    #[display("configured account @{} but credentials belong to @{}", expected, actual)]
    AccountMismatch {
        /// Handle named in the configuration
        expected: String,
        /// Handle of the authenticated user
        actual: String,
    },
    /// Logging could not be initialised.
    #[display("logging setup failed: {}", _0)]
    Logging(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use warbler_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::MissingCredential("TWITTER_ACCESS_TOKEN".into()));
/// assert!(format!("{}", err).contains("TWITTER_ACCESS_TOKEN is not set"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create an error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// The error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
