//! Configuration for the post composer.
//!
//! [`MAX_LENGTH`] and [`SUBMISSION_LATENCY`] are the fixed contract shared by
//! the view layer, the reactor and the submission service. Everything else
//! can be loaded from environment variables with sensible defaults.

use reactorkit_runtime::relay::DEFAULT_RELAY_CAPACITY;
use reactorkit_runtime::{MAX_CHANNEL_CAPACITY, StoreConfig};
use std::env;
use std::time::Duration;

/// Maximum post length, in characters
pub const MAX_LENGTH: usize = 140;

/// Simulated latency of one submission
pub const SUBMISSION_LATENCY: Duration = Duration::from_secs(1);

/// Composer configuration.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// How long the simulated submission takes
    pub submission_latency: Duration,
    /// Buffered notifications per completion/error subscriber
    pub channel_capacity: usize,
    /// Store runtime configuration
    pub store: StoreConfig,
}

impl ComposerConfig {
    /// Load configuration from environment variables.
    ///
    /// | variable | default |
    /// |---|---|
    /// | `COMPOSER_SUBMISSION_LATENCY_MS` | 1000 |
    /// | `COMPOSER_CHANNEL_CAPACITY` | 16 |
    /// | `COMPOSER_STATE_CAPACITY` | 64 |
    /// | `COMPOSER_SHUTDOWN_TIMEOUT_SECS` | 30 |
    ///
    /// Unparseable values fall back to the default, and so do capacities
    /// outside `1..=MAX_CHANNEL_CAPACITY`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            submission_latency: env::var("COMPOSER_SUBMISSION_LATENCY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.submission_latency, Duration::from_millis),
            channel_capacity: parse_capacity(
                env::var("COMPOSER_CHANNEL_CAPACITY").ok().as_deref(),
                defaults.channel_capacity,
            ),
            store: StoreConfig::new(
                parse_capacity(
                    env::var("COMPOSER_STATE_CAPACITY").ok().as_deref(),
                    defaults.store.state_capacity,
                ),
                env::var("COMPOSER_SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map_or(defaults.store.default_shutdown_timeout, Duration::from_secs),
            ),
        }
    }

    /// Override the simulated submission latency
    #[must_use]
    pub const fn with_submission_latency(mut self, latency: Duration) -> Self {
        self.submission_latency = latency;
        self
    }

    /// Override the notification channel capacity
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            submission_latency: SUBMISSION_LATENCY,
            channel_capacity: DEFAULT_RELAY_CAPACITY,
            store: StoreConfig::default(),
        }
    }
}

/// Parse a channel capacity, keeping `default` for missing, unparseable or
/// out-of-range values
fn parse_capacity(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse().ok())
        .filter(|n| (1..=MAX_CHANNEL_CAPACITY).contains(n))
        .unwrap_or(default)
}
