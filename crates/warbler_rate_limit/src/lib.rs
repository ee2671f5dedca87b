//! Request pacing for one platform account.
//!
//! This crate provides the [`RequestQueue`], which serializes every remote call
//! of an account, spaces calls out with a randomized delay, waits out rate
//! limits, and retries transient failures with capped exponential backoff.
//!
//! ## Failure handling
//!
//! - Rate-limited operations go back to the head of the queue and the queue
//!   sleeps until the reported reset time plus a safety buffer, or backs off
//!   when no reset time was reported. They are retried until they get through.
//! - Retryable failures go back to the head once (configurable) after backoff;
//!   if the retry fails too, the caller receives that error.
//! - Everything else is returned to the caller immediately.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod config;
mod headers;
mod queue;

pub use backoff::{exponential_backoff, reset_wait};
pub use config::{QueueConfig, QueueConfigBuilder};
pub use headers::{RateLimitHeaders, RateLimitTracker};
pub use queue::RequestQueue;
