//! Integer aliases shared by the bucket window.
//!
//! Bucket ids are signed: they are derived from nanoseconds since the Unix
//! epoch, and re-based slot indices may legitimately go negative (see
//! [`BucketsMeta::actualize_index`](crate::buckets::BucketsMeta::actualize_index)).

/// Identifier of a fixed-width time slice, monotonic with time.
///
/// `floor(nanos_since_epoch / interval_nanos)`. With a one-nanosecond
/// interval this still covers every instant representable as `i64`
/// nanoseconds (roughly the years 1677 to 2262).
pub type BucketId = i64;

/// Default counter type stored in each bucket.
pub type Uint = u64;
