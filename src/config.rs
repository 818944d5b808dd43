//! Window configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Configuration structure for creating a [`BucketWindowCore`](crate::BucketWindowCore).
///
/// Deserializes from any serde format; `interval` uses serde's standard
/// [`Duration`] representation (`{ "secs": .., "nanos": .. }`).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bucket_window_core::BucketWindowConfig;
///
/// let config = BucketWindowConfig::new(60, Duration::from_secs(1));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.window_span(), Some(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketWindowConfig {
    /// Number of buckets in the window.
    pub count: usize,
    /// Width of each bucket.
    pub interval: Duration,
}

impl BucketWindowConfig {
    /// Creates a new configuration instance.
    pub fn new(count: usize, interval: Duration) -> Self {
        Self { count, interval }
    }

    /// Rejects a zero `count`, a zero `interval` and a window span that
    /// overflows [`Duration`].
    pub fn validate(&self) -> ConfigResult<()> {
        if self.count == 0 {
            return Err(ConfigError::ZeroCount);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.window_span().is_none() {
            return Err(ConfigError::WindowTooWide {
                count: self.count,
                interval: self.interval,
            });
        }
        Ok(())
    }

    /// Total time covered by the window, `count * interval`.
    pub fn window_span(&self) -> Option<Duration> {
        let count = u32::try_from(self.count).ok()?;
        self.interval.checked_mul(count)
    }
}
