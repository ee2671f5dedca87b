//! JSON encoding and decoding errors.

/// Which stage of JSON handling failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// Input was not well-formed JSON.
    #[display("syntax")]
    Syntax,
    /// Input ended in the middle of a value, as in a truncated file.
    #[display("truncated input")]
    Truncated,
    /// Well-formed JSON did not match the expected shape.
    #[display("unexpected shape")]
    Shape,
    /// Reading or writing the underlying stream failed.
    #[display("io")]
    Io,
}

impl From<serde_json::error::Category> for JsonErrorKind {
    fn from(category: serde_json::error::Category) -> Self {
        use serde_json::error::Category;
        match category {
            Category::Syntax => Self::Syntax,
            Category::Eof => Self::Truncated,
            Category::Data => Self::Shape,
            Category::Io => Self::Io,
        }
    }
}

/// JSON error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error ({}): {} at line {} in {}", kind, message, line, file)]
pub struct JsonError {
    kind: JsonErrorKind,
    message: String,
    line: u32,
    file: &'static str,
}

impl JsonError {
    /// Create an error at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use warbler_error::{JsonError, JsonErrorKind};
    ///
    /// let err = JsonError::new(JsonErrorKind::Shape, "missing field `id`");
    /// assert_eq!(*err.kind(), JsonErrorKind::Shape);
    /// ```
    #[track_caller]
    pub fn new(kind: JsonErrorKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// The failure kind.
    pub fn kind(&self) -> &JsonErrorKind {
        &self.kind
    }

    /// Detail reported by the parser or serializer.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for JsonError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.classify().into(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_input_is_classified() {
        let err = serde_json::from_str::<serde_json::Value>("{\"id\": ").unwrap_err();
        assert_eq!(*JsonError::from(err).kind(), JsonErrorKind::Truncated);
    }

    #[test]
    fn shape_mismatch_is_classified() {
        let err = serde_json::from_str::<Vec<u8>>("{}").unwrap_err();
        assert_eq!(*JsonError::from(err).kind(), JsonErrorKind::Shape);
    }
}
