//! Warbler - rate-limited Twitter client for autonomous agents
//!
//! Warbler lets an agent read and write Twitter without tripping platform
//! limits. Every remote call of an account goes through one serialized,
//! jittered request queue; expired credentials are refreshed and rate limits
//! waited out transparently. Fetched posts are cached on disk and mirrored
//! into the agent's memory store exactly once.
//!
//! # Features
//!
//! - **Request pacing**: one in-flight call per account, randomized gaps,
//!   reset-aware rate-limit handling and capped exponential backoff
//! - **Auth recovery**: one refresh-token exchange and retry on expiry
//! - **Thread reconstruction**: reply chains walked to their root, cycle safe
//! - **Timeline reconciliation**: only posts unknown to memory are ingested
//! - **Publishing**: long content split on word boundaries into reply chains
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warbler::{Collaborators, EnvCredentials, TwitterClient, WarblerConfig, init_observability};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_observability()?;
//!
//!     let config = WarblerConfig::load()?;
//!     let env = EnvCredentials::from_env()?;
//!     let store = env.store();
//!     let api = env.api_client(&config, store.clone())?;
//!
//!     let client = TwitterClient::connect(
//!         Collaborators {
//!             api: Arc::new(api),
//!             memory: Arc::new(my_memory_store()),
//!             runtime: Arc::new(my_runtime()),
//!             credentials: store,
//!         },
//!         config.client_settings(),
//!     )
//!     .await?;
//!
//!     client.publisher().publish_and_remember("hello", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - OpenTelemetry span export to stdout
//!
//! # Architecture
//!
//! - `warbler_error` - Error types
//! - `warbler_core` - Posts, memories, credentials, deterministic IDs
//! - `warbler_interface` - Platform, memory store and runtime traits
//! - `warbler_rate_limit` - Request queue and backoff
//! - `warbler_cache` - On-disk post cache and checkpoint
//! - `warbler_social` - Twitter client and agent workflows
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod credentials;
mod observability;

pub use config::WarblerConfig;
pub use credentials::{
    ACCESS_TOKEN_VAR, CLIENT_ID_VAR, CLIENT_SECRET_VAR, EnvCredentials, REFRESH_TOKEN_VAR,
};
pub use observability::{ObservabilityConfig, init_observability, init_observability_with_config};

pub use warbler_cache::*;
pub use warbler_core::*;
pub use warbler_error::*;
pub use warbler_interface::*;
pub use warbler_rate_limit::*;
pub use warbler_social::*;
