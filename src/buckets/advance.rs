use log::{debug, trace};

use crate::buckets::meta::BucketsMeta;
use crate::buckets::time_mapper::UnixNanos;
use crate::types::BucketId;
use crate::zero_value::ZeroValue;

/// What [`advance`] did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// First use: the window was anchored so that it ends at the current
    /// bucket. The store was left as is.
    Initialized,
    /// The current bucket is already tracked (or lies behind the window after
    /// a clock regression). Nothing changed.
    Unchanged,
    /// The window moved forward by `shift` buckets. When `shift >= count`
    /// every bucket was reset.
    Slid { shift: BucketId },
}

/// Brings the window up to `now`, remapping surviving counters.
///
/// Must run before any read or write for the current request, inside the same
/// critical section as the subsequent [`locate`](BucketsMeta::locate) and
/// increment.
///
/// # Algorithm
///
/// - **Uninitialized**: the window is anchored to end at the bucket of `now`.
///   The store is assumed to be zeroed already and is not touched.
/// - **Covered** (`id(now) <= max_id`): no-op, which makes repeated calls with
///   the same `now` idempotent. A `now` behind `min_id` is treated the same.
/// - **Behind** (`id(now) > max_id`): with `shift = id(now) - max_id`, the
///   value of old slot `i` moves to slot `i - shift` if that slot exists;
///   every other slot gets `zero.zero()`. Both ends of the window move
///   forward by `shift`.
///
/// `store` must hold exactly `meta.count()` buckets. The slide costs
/// O(count) regardless of `shift`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bucket_window_core::buckets::{advance, Advance, BucketsMeta};
///
/// let second = Duration::from_secs(1);
/// // Buckets 100, 101, 102.
/// let mut meta = BucketsMeta::with_window(3, second, 100);
/// let mut store = vec![1_u64, 2, 3];
///
/// let outcome = advance(&mut store, &mut meta, &|| 0, Duration::from_secs(104));
///
/// assert_eq!(outcome, Advance::Slid { shift: 2 });
/// assert_eq!(store, vec![3, 0, 0]);
/// assert_eq!(meta.window(), Some(102..=104));
/// ```
pub fn advance<T, Z, N>(store: &mut Vec<T>, meta: &mut BucketsMeta, zero: &Z, now: N) -> Advance
where
    Z: ZeroValue<T> + ?Sized,
    N: UnixNanos,
{
    debug_assert_eq!(store.len(), meta.count(), "store must hold one slot per bucket");

    let current_id = meta.bucket_id(now);

    let max_id = match meta.max_id() {
        Some(max_id) => max_id,
        None => {
            meta.anchor_at(current_id);
            debug!(
                "bucket window initialized, count: {}, interval: {:?}, window: {:?}",
                meta.count(),
                meta.interval(),
                meta.window()
            );
            return Advance::Initialized;
        }
    };

    if current_id <= max_id {
        if !meta.contains(current_id) {
            trace!("bucket {} is behind window ending at {}, ignored", current_id, max_id);
        }
        return Advance::Unchanged;
    }

    // Saturates only when the gap exceeds the id range, which resets anyway.
    let shift = current_id.saturating_sub(max_id);
    let count = meta.count();

    let mut slid: Vec<T> = (0..count).map(|_| zero.zero()).collect();
    if shift <= meta.span() {
        // Old slot `i` lands on `i - shift`; only the newest `count - shift`
        // old slots survive.
        let offset = shift as usize;
        for (new_index, value) in store.drain(offset..).enumerate() {
            slid[new_index] = value;
        }
        meta.shift_by(shift);
        trace!("bucket window slid by {}, max_id: {}", shift, current_id);
    } else {
        meta.anchor_at(current_id);
        debug!(
            "bucket window idle for {} buckets, all {} buckets reset, max_id: {}",
            shift, count, current_id
        );
    }

    *store = slid;

    Advance::Slid { shift }
}
