//! Bucket window algorithms.
//!
//! The pieces a throttle needs to keep per-interval counters over a rolling
//! window, usable without any locking:
//!
//! - **[`time_to_bucket_id`]** maps a timestamp to the id of its bucket
//! - **[`BucketsMeta`]** holds the window geometry, re-bases slot indices and
//!   locates the bucket for a timestamp
//! - **[`advance()`]** slides the window forward and remaps the bucket store
//!
//! [`BucketWindowCore`](crate::BucketWindowCore) wraps them behind a mutex.

pub mod time_mapper;
pub use time_mapper::time_to_bucket_id;
pub use time_mapper::UnixNanos;

pub mod meta;
pub use meta::BucketsMeta;

pub mod advance;
pub use advance::advance;
pub use advance::Advance;
