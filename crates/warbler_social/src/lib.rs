//! Twitter account integration for warbler agents.
//!
//! A [`TwitterClient`] represents one authenticated account. Every remote call
//! it makes goes through the account's [`RequestQueue`](warbler_rate_limit::RequestQueue)
//! and is wrapped by [`AuthRecovery`], which refreshes expired credentials and
//! waits out rate limits before retrying once.
//!
//! On top of the client sit three workflows:
//!
//! - [`ThreadBuilder`] walks a reply chain toward its root and remembers every
//!   post on the way
//! - [`TimelinePopulator`] ingests timeline posts the agent has not seen yet
//! - [`Publisher`] splits long content into a chain of replies and records
//!   what was published
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warbler_core::Credentials;
//! use warbler_interface::InMemoryMemoryStore;
//! use warbler_social::{ClientSettings, Collaborators, CredentialStore, TwitterApiClient, TwitterClient};
//! # use warbler_interface::AgentRuntime;
//! # async fn example(runtime: Arc<dyn AgentRuntime>) -> warbler_error::WarblerResult<()> {
//! let settings = ClientSettings::default();
//! let credentials = CredentialStore::new(Credentials::new("token", None));
//! let api = TwitterApiClient::new(&settings.twitter, credentials.clone())?;
//!
//! let client = TwitterClient::connect(
//!     Collaborators {
//!         api: Arc::new(api),
//!         memory: Arc::new(InMemoryMemoryStore::default()),
//!         runtime,
//!         credentials,
//!     },
//!     settings,
//! )
//! .await?;
//!
//! client.publisher().publish("hello from warbler", None).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod client;
mod config;
mod publisher;
mod thread;
mod timeline;
mod twitter;

pub use auth::{AuthRecovery, CredentialStore};
pub use client::{ClientSettings, Collaborators, TwitterClient};
pub use config::{AuthConfig, AuthConfigBuilder, TwitterConfig, TwitterConfigBuilder};
pub use publisher::{Publisher, split_content};
pub use thread::ThreadBuilder;
pub use timeline::TimelinePopulator;
pub use twitter::{
    Includes, Tweet, TwitterApiClient, TwitterResponse, permanent_url, tweet_to_post,
};
