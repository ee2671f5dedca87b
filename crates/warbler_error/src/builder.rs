//! Errors assembling domain records.

/// A record could not be assembled from the data at hand.
///
/// # Examples
///
/// ```
/// use warbler_error::BuilderError;
///
/// let err = BuilderError::incomplete("Memory", "`room_id` must be initialized");
/// assert_eq!(err.record(), "Memory");
/// assert!(format!("{}", err).contains("room_id"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: incomplete {}: {} at line {} in {}", record, detail, line, file)]
pub struct BuilderError {
    record: &'static str,
    detail: String,
    line: u32,
    file: &'static str,
}

impl BuilderError {
    /// A `record` was missing data it requires.
    #[track_caller]
    pub fn incomplete(record: &'static str, detail: impl std::fmt::Display) -> Self {
        let location = std::panic::Location::caller();
        Self {
            record,
            detail: detail.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Name of the record type being built.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// What was missing.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
