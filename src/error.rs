//! error.rs
//! Error types for the ambient edges of the bucket window.
//!
//! The window algorithms themselves never fail: out-of-window timestamps are
//! clamped and stale clocks are ignored. Errors only surface when validating a
//! configuration or when the non-blocking path finds the window locked.

use std::time::Duration;

use thiserror::Error as ThisError;

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected [`BucketWindowConfig`](crate::config::BucketWindowConfig).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    /// The window must hold at least one bucket.
    #[error("bucket count must be greater than 0")]
    ZeroCount,
    /// Buckets must have a non-zero width.
    #[error("bucket interval must be greater than 0")]
    ZeroInterval,
    /// `count * interval` does not fit into a [`Duration`].
    #[error("window of {count} buckets of {interval:?} overflows")]
    WindowTooWide { count: usize, interval: Duration },
}

/// Failure of a non-blocking window operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum WindowError {
    /// The window is locked by another request handler. Retry or back off.
    #[error("bucket window is locked by another operation")]
    ContentionFailure,
}
