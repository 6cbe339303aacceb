//! Server configuration parsed from environment variables.
//!
//! Every key is optional. Unset or unparsable values fall back to the
//! defaults below.

use std::time::Duration;

use crate::whiteboard::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IDLE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub port: u16,
    /// Idle time after which a whiteboard is evicted. `None` disables eviction.
    pub idle_ttl: Option<Duration>,
    pub sweep_interval: Duration,
    pub subscriber_capacity: usize,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            idle_ttl: Some(Duration::from_secs(DEFAULT_IDLE_TTL_SECS)),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            subscriber_capacity: DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY,
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
        }
    }
}

impl HubConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `WHITEBOARD_IDLE_TTL_SECS`: default 86400, `0` disables eviction
    /// - `WHITEBOARD_SWEEP_INTERVAL_SECS`: default 300
    /// - `SUBSCRIBER_CHANNEL_CAPACITY`: default 256
    /// - `DEFAULT_CANVAS_WIDTH` / `DEFAULT_CANVAS_HEIGHT`: default 800 x 500
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let idle_ttl_secs = env_parse(&lookup, "WHITEBOARD_IDLE_TTL_SECS", DEFAULT_IDLE_TTL_SECS);
        Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            idle_ttl: (idle_ttl_secs > 0).then(|| Duration::from_secs(idle_ttl_secs)),
            sweep_interval: Duration::from_secs(
                env_parse(&lookup, "WHITEBOARD_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS).max(1),
            ),
            subscriber_capacity: env_parse(&lookup, "SUBSCRIBER_CHANNEL_CAPACITY", DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY)
                .max(1),
            default_width: nonzero(env_parse(&lookup, "DEFAULT_CANVAS_WIDTH", DEFAULT_WIDTH), DEFAULT_WIDTH),
            default_height: nonzero(env_parse(&lookup, "DEFAULT_CANVAS_HEIGHT", DEFAULT_HEIGHT), DEFAULT_HEIGHT),
        }
    }
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn nonzero(value: u32, default: u32) -> u32 {
    if value == 0 { default } else { value }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
