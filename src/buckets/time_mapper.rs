//! Timestamp to bucket id mapping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::BucketId;

/// Anything that can be expressed as signed nanoseconds since the Unix epoch.
///
/// Implemented for [`SystemTime`], for [`Duration`] (read as an offset from
/// the epoch) and for raw `i64` nanoseconds, so callers can feed the window
/// from a wall clock or from synthetic ticks in tests.
pub trait UnixNanos {
    fn unix_nanos(&self) -> i128;
}

impl UnixNanos for SystemTime {
    fn unix_nanos(&self) -> i128 {
        match self.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_nanos() as i128,
            Err(before) => -(before.duration().as_nanos() as i128),
        }
    }
}

impl UnixNanos for Duration {
    #[inline]
    fn unix_nanos(&self) -> i128 {
        self.as_nanos() as i128
    }
}

impl UnixNanos for i64 {
    #[inline]
    fn unix_nanos(&self) -> i128 {
        *self as i128
    }
}

impl<T: UnixNanos + ?Sized> UnixNanos for &T {
    #[inline]
    fn unix_nanos(&self) -> i128 {
        (**self).unix_nanos()
    }
}

/// Maps `t` to the id of the `interval`-wide slice that contains it.
///
/// Slices are half-open and aligned to the Unix epoch, so two timestamps share
/// an id iff they fall in the same `[k * interval, (k + 1) * interval)` range.
/// Instants before the epoch floor towards negative ids. Ids beyond the
/// [`BucketId`] range saturate at `BucketId::MIN` / `BucketId::MAX`, so the
/// mapping stays monotonic for every input.
///
/// `interval` must be non-zero.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bucket_window_core::buckets::time_to_bucket_id;
///
/// let second = Duration::from_secs(1);
/// assert_eq!(time_to_bucket_id(Duration::from_millis(2_999), second), 2);
/// assert_eq!(time_to_bucket_id(Duration::from_millis(3_000), second), 3);
/// assert_eq!(time_to_bucket_id(-1_i64, second), -1);
/// ```
#[inline]
pub fn time_to_bucket_id<T: UnixNanos>(t: T, interval: Duration) -> BucketId {
    let width = interval.as_nanos() as i128;
    let id = t.unix_nanos().div_euclid(width);
    BucketId::try_from(id).unwrap_or(if id < 0 { BucketId::MIN } else { BucketId::MAX })
}
