//! Request queue configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and retry parameters for a [`RequestQueue`](crate::RequestQueue).
///
/// # Example
///
/// ```toml
/// [queue]
/// min_delay_ms = 1500
/// max_delay_ms = 3500
/// backoff_base_ms = 1000
/// backoff_ceiling_ms = 60000
/// reset_buffer_ms = 1000
/// max_retries = 1
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct QueueConfig {
    /// Lower bound of the randomized delay between operations (ms)
    #[serde(default = "default_min_delay_ms")]
    #[builder(default = "default_min_delay_ms()")]
    min_delay_ms: u64,

    /// Upper bound of the randomized delay between operations (ms)
    #[serde(default = "default_max_delay_ms")]
    #[builder(default = "default_max_delay_ms()")]
    max_delay_ms: u64,

    /// Base of the exponential backoff (ms)
    #[serde(default = "default_backoff_base_ms")]
    #[builder(default = "default_backoff_base_ms()")]
    backoff_base_ms: u64,

    /// Ceiling of the exponential backoff (ms)
    #[serde(default = "default_backoff_ceiling_ms")]
    #[builder(default = "default_backoff_ceiling_ms()")]
    backoff_ceiling_ms: u64,

    /// Added to every wait for a reported rate-limit reset (ms)
    #[serde(default = "default_reset_buffer_ms")]
    #[builder(default = "default_reset_buffer_ms()")]
    reset_buffer_ms: u64,

    /// In-queue retries of a transient non-rate-limit failure
    #[serde(default = "default_max_retries")]
    #[builder(default = "default_max_retries()")]
    max_retries: u32,
}

fn default_min_delay_ms() -> u64 {
    1500
}

fn default_max_delay_ms() -> u64 {
    3500
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_ceiling_ms() -> u64 {
    60_000
}

fn default_reset_buffer_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    1
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_ceiling_ms: default_backoff_ceiling_ms(),
            reset_buffer_ms: default_reset_buffer_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl QueueConfig {
    /// Backoff base as a duration.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Backoff ceiling as a duration.
    pub fn backoff_ceiling(&self) -> Duration {
        Duration::from_millis(self.backoff_ceiling_ms)
    }

    /// Reset safety buffer as a duration.
    pub fn reset_buffer(&self) -> Duration {
        Duration::from_millis(self.reset_buffer_ms)
    }

    /// Draw a delay uniformly from `[min_delay_ms, max_delay_ms]`.
    pub fn inter_request_delay(&self) -> Duration {
        use rand::Rng;

        if self.max_delay_ms <= self.min_delay_ms {
            return Duration::from_millis(self.min_delay_ms);
        }
        let millis = rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_in_range() {
        let config = QueueConfig::default();
        for _ in 0..200 {
            let delay = config.inter_request_delay();
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay <= Duration::from_millis(3500));
        }
    }

    #[test]
    fn inverted_range_uses_minimum() {
        let config = QueueConfig::default()
            .with_min_delay_ms(200)
            .with_max_delay_ms(100);
        assert_eq!(config.inter_request_delay(), Duration::from_millis(200));
    }

    #[test]
    fn builder_fills_defaults() {
        let config = QueueConfigBuilder::default()
            .max_retries(3_u32)
            .build()
            .unwrap();
        assert_eq!(*config.max_retries(), 3);
        assert_eq!(*config.backoff_ceiling_ms(), 60_000);
    }
}
