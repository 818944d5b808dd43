//! A fixed-interval sliding window of event counters.
//!
//! The window is the counting heart of a throttle: it keeps one counter per
//! time bucket for the most recent `count` buckets, slides forward as time
//! passes, and lets the caller compare the total against a limit. The
//! accept/deny policy itself is up to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use bucket_window_core::BucketWindowCore;
//!
//! // Allow at most 3 events per 10 seconds, tracked in 1 second buckets.
//! let limit = 3;
//! let window = BucketWindowCore::new(10, Duration::from_secs(1));
//!
//! let mut admitted = 0;
//! for ms in [0, 200, 400, 600, 800] {
//!     let now = Duration::from_millis(1_000_000 + ms);
//!     if window.sum_at(now) < limit {
//!         window.increment_at(now, 1);
//!         admitted += 1;
//!     }
//! }
//! assert_eq!(admitted, 3);
//!
//! // Ten seconds later the first bucket has left the window.
//! assert_eq!(window.sum_at(Duration::from_secs(1_010)), 0);
//! ```
//!
//! # Core Concepts
//!
//! ## Buckets and Ids
//! Time is cut into half-open slices of `interval` width aligned to the Unix
//! epoch. A slice's [`BucketId`] is `floor(nanos_since_epoch / interval)`;
//! see [`buckets::time_to_bucket_id`].
//!
//! ## Window
//! The window tracks `count` consecutive ids, `min_id..=max_id`. Slot `i` of
//! the bucket store holds the count for id `min_id + i`. Advancing to a later
//! time shifts surviving counters towards slot 0 and resets vacated slots with
//! a pluggable [`ZeroValue`].
//!
//! ## Time
//! The window never reads a clock. Every operation takes the time from the
//! caller as anything implementing [`buckets::UnixNanos`]: a
//! [`SystemTime`](std::time::SystemTime), a [`Duration`](std::time::Duration)
//! since the epoch, or raw `i64` nanoseconds.
//!
//! ## Thread Safety
//! [`BucketWindowCore`] guards the whole window with one mutex. The lock-free
//! building blocks in [`buckets`] are available for callers that bring their
//! own synchronization.

pub mod types;
pub use types::BucketId;
pub use types::Uint;

pub mod error;
pub use error::ConfigError;
pub use error::ConfigResult;
pub use error::WindowError;

pub mod zero_value;
pub use zero_value::DefaultZero;
pub use zero_value::ZeroValue;

pub mod buckets;

pub mod config;
pub use config::BucketWindowConfig;

pub mod bucket_window_core;
pub use bucket_window_core::BucketWindowCore;
pub use bucket_window_core::BucketWindowState;
pub use bucket_window_core::WindowSnapshot;
