//! Memory store error types.

/// Kinds of memory store failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MemoryErrorKind {
    /// The store could not complete a read
    #[display("Memory query failed: {}", _0)]
    Query(String),
    /// The store rejected a write
    #[display("Memory write failed: {}", _0)]
    Write(String),
    /// An identity/room upsert failed in the runtime
    #[display("Runtime linkage failed: {}", _0)]
    Linkage(String),
}

/// Memory store error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Memory Error: {} at line {} in {}", kind, line, file)]
pub struct MemoryError {
    kind: MemoryErrorKind,
    line: u32,
    file: &'static str,
}

impl MemoryError {
    /// Create a new memory error with caller location tracking.
    #[track_caller]
    pub fn new(kind: MemoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MemoryErrorKind {
        &self.kind
    }
}
