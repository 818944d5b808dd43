use std::ops::RangeInclusive;
use std::time::Duration;

use crate::buckets::time_mapper::{time_to_bucket_id, UnixNanos};
use crate::types::BucketId;

/// Geometry of a bucket window and the id range it currently tracks.
///
/// A window is `count` consecutive buckets of `interval` width. Once
/// initialized, logical slot `0` holds bucket `min_id` and slot `count - 1`
/// holds bucket `max_id`, with `max_id - min_id == count - 1` at all times.
///
/// `count` and `interval` are fixed for the lifetime of the metadata; the id
/// range only moves through [`advance`](crate::buckets::advance()).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bucket_window_core::buckets::BucketsMeta;
///
/// // Buckets 10, 11, 12 and 13.
/// let meta = BucketsMeta::with_window(4, Duration::from_secs(1), 10);
///
/// assert_eq!(meta.max_id(), Some(13));
/// assert_eq!(meta.index_of(12), Some(2));
/// assert_eq!(meta.locate(Duration::from_secs(99)), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketsMeta {
    /// Number of buckets in the window
    count: usize,
    /// Width of a single bucket
    interval: Duration,
    /// Bucket id held in slot 0
    min_id: BucketId,
    /// Bucket id held in slot `count - 1`
    max_id: BucketId,
    /// Whether `min_id`/`max_id` describe a real range yet
    initialized: bool,
}

impl BucketsMeta {
    /// Creates uninitialized metadata. The first
    /// [`advance`](crate::buckets::advance()) anchors the window at the
    /// current time.
    ///
    /// # Panics
    ///
    /// Panics if `count` or `interval` is zero.
    pub fn new(count: usize, interval: Duration) -> Self {
        assert!(count > 0, "count must be greater than 0");
        assert!(!interval.is_zero(), "interval must be greater than 0");

        BucketsMeta {
            count,
            interval,
            min_id: 0,
            max_id: 0,
            initialized: false,
        }
    }

    /// Creates metadata whose window starts at bucket `min_id`.
    ///
    /// A window that would run past `BucketId::MAX` ends at `BucketId::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if `count` or `interval` is zero.
    pub fn with_window(count: usize, interval: Duration, min_id: BucketId) -> Self {
        let mut meta = BucketsMeta::new(count, interval);
        meta.anchor_at(min_id.saturating_add(meta.span()));
        meta
    }

    /// Number of buckets in the window.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Width of a single bucket.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` once the first advance anchored the window.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bucket id of slot 0, or `None` before the first advance.
    #[inline]
    pub fn min_id(&self) -> Option<BucketId> {
        self.initialized.then(|| self.min_id)
    }

    /// Bucket id of slot `count - 1`, or `None` before the first advance.
    #[inline]
    pub fn max_id(&self) -> Option<BucketId> {
        self.initialized.then(|| self.max_id)
    }

    /// The tracked id range, `min_id..=max_id`.
    pub fn window(&self) -> Option<RangeInclusive<BucketId>> {
        self.initialized.then(|| self.min_id..=self.max_id)
    }

    /// Maps a timestamp to its bucket id using this window's interval.
    #[inline]
    pub fn bucket_id<T: UnixNanos>(&self, t: T) -> BucketId {
        time_to_bucket_id(t, self.interval)
    }

    /// Returns `true` if `id` is currently tracked.
    #[inline]
    pub fn contains(&self, id: BucketId) -> bool {
        self.initialized && self.min_id <= id && id <= self.max_id
    }

    /// Slot holding bucket `id`, if it is inside the window.
    pub fn index_of(&self, id: BucketId) -> Option<usize> {
        if self.contains(id) {
            Some((id - self.min_id) as usize)
        } else {
            None
        }
    }

    /// Bucket id held in slot `index`.
    pub fn id_at(&self, index: usize) -> Option<BucketId> {
        if self.initialized && index < self.count {
            Some(self.min_id + index as BucketId)
        } else {
            None
        }
    }

    /// Re-bases `index`, computed while the window ended at `max_id`, onto a
    /// window ending at `new_reference_id`.
    ///
    /// Returns the shifted index and whether it is still representable. Only
    /// underflow is reported: a reference behind `max_id` pushes the index
    /// towards slot 0 and eventually past it. A reference ahead of `max_id`
    /// could overflow the window, but the advancer never produces one before
    /// sliding, so that case is not checked here.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::buckets::BucketsMeta;
    ///
    /// // Window 3..=12.
    /// let meta = BucketsMeta::with_window(10, Duration::from_secs(1), 3);
    ///
    /// assert_eq!(meta.actualize_index(12, 5), (5, true));
    /// assert_eq!(meta.actualize_index(10, 5), (3, true));
    /// assert_eq!(meta.actualize_index(0, 5), (-7, false));
    /// ```
    pub fn actualize_index(&self, new_reference_id: BucketId, index: usize) -> (i64, bool) {
        let index = index as i64;
        if new_reference_id == self.max_id {
            return (index, true);
        }

        let new_index = index.saturating_add(new_reference_id.saturating_sub(self.max_id));
        (new_index, new_index >= 0)
    }

    /// Bucket id that an event at `ts` is credited to.
    ///
    /// The mapped id is clamped into `[min_id, max_id]`, so a timestamp ahead
    /// of the window lands in the newest bucket and one behind it lands in the
    /// oldest. Before the first advance there is no window to clamp into and
    /// the raw id is returned.
    pub fn locate<T: UnixNanos>(&self, ts: T) -> BucketId {
        let id = self.bucket_id(ts);
        if !self.initialized {
            return id;
        }
        id.clamp(self.min_id, self.max_id)
    }

    /// Distance between the first and last id of the window.
    #[inline]
    pub(crate) fn span(&self) -> BucketId {
        BucketId::try_from(self.count - 1).unwrap_or(BucketId::MAX)
    }

    /// Makes `max_id` the newest bucket and derives `min_id` from it.
    ///
    /// A window that would start below `BucketId::MIN` is pinned to start at
    /// `BucketId::MIN`, keeping `max_id - min_id == count - 1`.
    pub(crate) fn anchor_at(&mut self, max_id: BucketId) {
        let span = self.span();
        self.max_id = max_id.max(BucketId::MIN.saturating_add(span));
        self.min_id = self.max_id - span;
        self.initialized = true;
    }

    /// Moves both ends of the window forward by `shift` buckets.
    pub(crate) fn shift_by(&mut self, shift: BucketId) {
        self.min_id = self.min_id.saturating_add(shift);
        self.max_id = self.max_id.saturating_add(shift);
    }

    pub(crate) fn clear(&mut self) {
        self.min_id = 0;
        self.max_id = 0;
        self.initialized = false;
    }
}
