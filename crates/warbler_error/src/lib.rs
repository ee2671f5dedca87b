//! Error types for the warbler social agent client.
//!
//! This crate provides the foundation error types used throughout the warbler workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Remote platform failures are classified by [`PlatformErrorKind`], which is what
//! the request queue and auth recovery inspect to decide between waiting,
//! refreshing credentials, retrying, or giving up.
//!
//! # Examples
//!
//! ```
//! use warbler_error::{PlatformError, PlatformErrorKind, WarblerResult};
//!
//! fn fetch_post() -> WarblerResult<String> {
//!     Err(PlatformError::new(PlatformErrorKind::RateLimited { reset: None }))?
//! }
//!
//! let err = fetch_post().unwrap_err();
//! assert!(err.is_rate_limited());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod http;
mod json;
mod memory;
mod platform;
mod storage;

pub use builder::BuilderError;
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{WarblerError, WarblerErrorKind, WarblerResult};
pub use http::{HttpError, HttpErrorKind};
pub use json::{JsonError, JsonErrorKind};
pub use memory::{MemoryError, MemoryErrorKind};
pub use platform::{PlatformError, PlatformErrorKind};
pub use storage::{StorageError, StorageErrorKind};
