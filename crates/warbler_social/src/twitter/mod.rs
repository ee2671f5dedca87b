//! Twitter v2 API integration.
//!
//! - **json_models**: wire shapes of v2 responses and request bodies
//! - **conversions**: mapping of tweets and their expansions onto [`Post`](warbler_core::Post)
//! - **client**: [`TwitterApiClient`], the HTTP implementation of
//!   [`PlatformApi`](warbler_interface::PlatformApi)

mod client;
mod conversions;
mod json_models;

pub use client::TwitterApiClient;
pub use conversions::{permanent_url, tweet_to_post};
pub use json_models::{Includes, Tweet, TwitterResponse};
