//! Layered configuration loading.
//!
//! Configuration is assembled from three TOML sources, later ones overriding
//! earlier ones key by key:
//!
//! 1. Bundled defaults (the crate's `warbler.toml`, compiled in)
//! 2. `~/.config/warbler/warbler.toml`
//! 3. `./warbler.toml`

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};
use warbler_error::{ConfigError, ConfigErrorKind, WarblerError, WarblerResult};
use warbler_rate_limit::QueueConfig;
use warbler_social::{AuthConfig, ClientSettings, TwitterConfig};

const DEFAULT_CONFIG: &str = include_str!("../warbler.toml");

/// Complete warbler configuration.
///
/// # Example
///
/// ```toml
/// [queue]
/// min_delay_ms = 1500
/// max_delay_ms = 3500
///
/// [twitter]
/// username = "warbler_bot"
/// dry_run = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct WarblerConfig {
    /// Request pacing
    #[serde(default)]
    queue: QueueConfig,
    /// Auth recovery
    #[serde(default)]
    auth: AuthConfig,
    /// Account settings
    #[serde(default)]
    twitter: TwitterConfig,
}

impl WarblerConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> WarblerResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/warbler/warbler.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("warbler").required(false));

        Self::finish(builder)
    }

    /// Load configuration from one file on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or cannot be parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> WarblerResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml));

        Self::finish(builder)
    }

    /// Parse configuration from a TOML string on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid configuration.
    pub fn from_toml_str(toml: &str) -> WarblerResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml));

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> WarblerResult<Self> {
        builder
            .build()
            .map_err(|e| {
                WarblerError::from(ConfigError::new(ConfigErrorKind::Invalid(format!(
                    "failed to build configuration: {}",
                    e
                ))))
            })?
            .try_deserialize()
            .map_err(|e| {
                WarblerError::from(ConfigError::new(ConfigErrorKind::Invalid(format!(
                    "failed to parse configuration: {}",
                    e
                ))))
            })
    }

    /// The sections a [`TwitterClient`](warbler_social::TwitterClient) consumes.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            queue: self.queue.clone(),
            auth: self.auth.clone(),
            twitter: self.twitter.clone(),
        }
    }
}
