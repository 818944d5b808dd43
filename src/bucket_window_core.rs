use std::fmt::{self, Debug};
use std::iter::Sum;
use std::ops::{AddAssign, RangeInclusive};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;

use crate::buckets::{advance, Advance, BucketsMeta, UnixNanos};
use crate::config::BucketWindowConfig;
use crate::error::{ConfigResult, WindowError};
use crate::types::{BucketId, Uint};
use crate::zero_value::{DefaultZero, ZeroValue};

/// Thread-safe sliding bucket window.
///
/// Keeps `count` per-interval counters for the most recent `count` buckets.
/// Every request handler shares one instance; the window metadata and the
/// bucket store live behind a single mutex, and each public method holds it
/// for its whole duration. Time is always supplied by the caller.
///
/// The accept/deny decision is left to the caller: advance the window, credit
/// the event, then compare [`sum`](Self::sum) against a limit. Methods such as
/// [`increment_at`](Self::increment_at) and [`sum_at`](Self::sum_at) advance
/// and read or write within one critical section, so a concurrent slide can
/// never land between them.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bucket_window_core::BucketWindowCore;
///
/// // 3 buckets of 1 second: a 3 second window.
/// let window = BucketWindowCore::new(3, Duration::from_secs(1));
///
/// window.increment_at(Duration::from_millis(10_100), 2); // bucket 10
/// window.increment_at(Duration::from_millis(11_500), 1); // bucket 11
/// assert_eq!(window.sum_at(Duration::from_secs(12)), 3);
///
/// // Bucket 10 leaves the window once bucket 13 starts.
/// assert_eq!(window.sum_at(Duration::from_secs(13)), 1);
/// ```
pub struct BucketWindowCore<T = Uint, Z = DefaultZero> {
    /// Number of buckets in the window
    count: usize,
    /// Width of each bucket
    interval: Duration,
    /// Window metadata and buckets, protected by mutex for thread safety
    state: Mutex<BucketWindowState<T, Z>>,
}

/// Window metadata, bucket store and zero producer.
///
/// Handed out by [`BucketWindowCore::with_state`] for callers that need a
/// custom sequence of operations inside one critical section.
pub struct BucketWindowState<T, Z> {
    meta: BucketsMeta,
    buckets: Vec<T>,
    zero: Z,
}

/// Consistent copy of a window taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot<T> {
    /// Tracked id range, `None` before the first advance
    pub window: Option<RangeInclusive<BucketId>>,
    /// One value per bucket, oldest first
    pub buckets: Vec<T>,
}

impl BucketWindowCore<Uint, DefaultZero> {
    /// Creates a window of `count` `u64` counters, `interval` wide each.
    ///
    /// The window is anchored on the first call that advances it.
    ///
    /// # Panics
    ///
    /// Panics if `count` or `interval` is zero. Use
    /// [`BucketWindowConfig`] to validate untrusted values first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::BucketWindowCore;
    ///
    /// // One minute of history at one second resolution.
    /// let window = BucketWindowCore::new(60, Duration::from_secs(1));
    /// assert_eq!(window.sum(), 0);
    /// ```
    pub fn new(count: usize, interval: Duration) -> Self {
        BucketWindowCore::with_zero(count, interval, DefaultZero)
    }
}

impl<T, Z: ZeroValue<T>> BucketWindowCore<T, Z> {
    /// Creates a window whose empty buckets are produced by `zero`.
    ///
    /// # Panics
    ///
    /// Panics if `count` or `interval` is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::BucketWindowCore;
    ///
    /// let window = BucketWindowCore::with_zero(4, Duration::from_millis(250), || 0_i32);
    /// window.add_at(Duration::ZERO, Duration::ZERO, -3);
    /// assert_eq!(window.sum(), -3);
    /// ```
    pub fn with_zero(count: usize, interval: Duration, zero: Z) -> Self {
        let meta = BucketsMeta::new(count, interval);
        let buckets = (0..count).map(|_| zero.zero()).collect();

        BucketWindowCore {
            count,
            interval,
            state: Mutex::new(BucketWindowState { meta, buckets, zero }),
        }
    }

    /// Creates a window from a validated configuration with a custom zero
    /// producer.
    pub fn from_config_with_zero(config: BucketWindowConfig, zero: Z) -> ConfigResult<Self> {
        config.validate()?;
        Ok(BucketWindowCore::with_zero(config.count, config.interval, zero))
    }

    /// Number of buckets in the window.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Width of each bucket.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Slides the window up to `now`. See [`advance()`](crate::buckets::advance()).
    pub fn advance<N: UnixNanos>(&self, now: N) -> Advance {
        self.lock().advance(now)
    }

    /// Bucket id an event at `ts` is credited to, clamped into the window.
    /// Does not advance.
    pub fn locate<N: UnixNanos>(&self, ts: N) -> BucketId {
        self.lock().locate(ts)
    }

    /// Runs `f` with exclusive access to the window state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::BucketWindowCore;
    ///
    /// let window = BucketWindowCore::new(5, Duration::from_secs(1));
    /// let now = Duration::from_secs(42);
    ///
    /// let admitted = window.with_state(|state| {
    ///     state.advance(now);
    ///     if state.sum() >= 1 {
    ///         return false;
    ///     }
    ///     state.add(now, 1).is_some()
    /// });
    /// assert!(admitted);
    /// ```
    pub fn with_state<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut BucketWindowState<T, Z>) -> R,
    {
        f(&mut self.lock())
    }

    /// Returns the window to its initial, unanchored state with every bucket
    /// reset to the zero value.
    pub fn reset(&self) {
        let mut state = self.lock();
        let BucketWindowState { meta, buckets, zero } = &mut *state;
        meta.clear();
        for bucket in buckets.iter_mut() {
            *bucket = zero.zero();
        }
    }

    /// Advances to `now`, then adds `amount` to the bucket of `ts`.
    ///
    /// Timestamps outside the window are credited to the nearest boundary
    /// bucket. Returns the id of the credited bucket.
    pub fn add_at<N, M>(&self, now: N, ts: M, amount: T) -> BucketId
    where
        N: UnixNanos,
        M: UnixNanos,
        T: AddAssign,
    {
        self.lock().record(now, ts, amount)
    }

    /// Advances to `now` and adds `amount` to the current bucket.
    pub fn increment_at<N>(&self, now: N, amount: T) -> BucketId
    where
        N: UnixNanos,
        T: AddAssign,
    {
        let now = now.unix_nanos();
        self.lock().record(Nanos(now), Nanos(now), amount)
    }

    /// Non-blocking [`increment_at`](Self::increment_at).
    ///
    /// # Returns
    ///
    /// * `Ok(id)` - The bucket that was credited
    /// * `Err(WindowError::ContentionFailure)` - The window is locked by another operation
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::{BucketWindowCore, WindowError};
    ///
    /// let window = BucketWindowCore::new(2, Duration::from_secs(1));
    ///
    /// assert_eq!(window.try_increment_at(Duration::from_secs(7), 1), Ok(7));
    ///
    /// window.with_state(|_| {
    ///     assert_eq!(
    ///         window.try_increment_at(Duration::from_secs(7), 1),
    ///         Err(WindowError::ContentionFailure)
    ///     );
    /// });
    /// ```
    pub fn try_increment_at<N>(&self, now: N, amount: T) -> Result<BucketId, WindowError>
    where
        N: UnixNanos,
        T: AddAssign,
    {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(WindowError::ContentionFailure),
        };

        let now = now.unix_nanos();
        Ok(state.record(Nanos(now), Nanos(now), amount))
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, BucketWindowState<T, Z>> {
        // Every mutation leaves the state consistent before anything that can
        // panic, so a poisoned lock is safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Sum<T>, Z: ZeroValue<T>> BucketWindowCore<T, Z> {
    /// Total over every tracked bucket, without advancing.
    pub fn sum(&self) -> T {
        self.lock().sum()
    }

    /// Advances to `now` and returns the total over the window.
    pub fn sum_at<N: UnixNanos>(&self, now: N) -> T {
        let mut state = self.lock();
        state.advance(now);
        state.sum()
    }
}

impl<T: Clone, Z: ZeroValue<T>> BucketWindowCore<T, Z> {
    /// Value of bucket `id`, or `None` if it is not tracked.
    pub fn get(&self, id: BucketId) -> Option<T> {
        self.lock().get(id).cloned()
    }

    /// Copies the current window out of the lock.
    pub fn snapshot(&self) -> WindowSnapshot<T> {
        let state = self.lock();
        WindowSnapshot {
            window: state.meta.window(),
            buckets: state.buckets.clone(),
        }
    }
}

impl<T, Z: ZeroValue<T>> BucketWindowState<T, Z> {
    /// Window geometry and the id range currently tracked.
    #[inline]
    pub fn meta(&self) -> &BucketsMeta {
        &self.meta
    }

    /// Buckets ordered oldest first.
    #[inline]
    pub fn buckets(&self) -> &[T] {
        &self.buckets
    }

    /// Slides the window up to `now`. See [`advance()`](crate::buckets::advance()).
    ///
    /// # Returns
    ///
    /// What happened to the window: anchored, unchanged or slid.
    pub fn advance<N: UnixNanos>(&mut self, now: N) -> Advance {
        advance(&mut self.buckets, &mut self.meta, &self.zero, now)
    }

    /// Bucket id an event at `ts` is credited to. See [`BucketsMeta::locate`].
    #[inline]
    pub fn locate<N: UnixNanos>(&self, ts: N) -> BucketId {
        self.meta.locate(ts)
    }

    /// Value of bucket `id`.
    ///
    /// # Returns
    ///
    /// * `Some(value)` - The bucket is tracked by the window
    /// * `None` - The id is outside the window, or the window is not anchored yet
    pub fn get(&self, id: BucketId) -> Option<&T> {
        self.meta.index_of(id).map(|index| &self.buckets[index])
    }

    /// Mutable access to bucket `id`, `None` if it is not tracked.
    pub fn get_mut(&mut self, id: BucketId) -> Option<&mut T> {
        let index = self.meta.index_of(id)?;
        Some(&mut self.buckets[index])
    }

    /// Adds `amount` to the bucket of `ts` without advancing.
    ///
    /// Returns the credited bucket id, or `None` before the first advance.
    pub fn add<N>(&mut self, ts: N, amount: T) -> Option<BucketId>
    where
        N: UnixNanos,
        T: AddAssign,
    {
        let id = self.locate(ts);
        *self.get_mut(id)? += amount;
        Some(id)
    }

    /// Total over every tracked bucket, without advancing.
    pub fn sum(&self) -> T
    where
        T: Clone + Sum<T>,
    {
        self.buckets.iter().cloned().sum()
    }

    fn record<N, M>(&mut self, now: N, ts: M, amount: T) -> BucketId
    where
        N: UnixNanos,
        M: UnixNanos,
        T: AddAssign,
    {
        self.advance(now);
        let id = self.locate(ts);
        if let Some(bucket) = self.get_mut(id) {
            *bucket += amount;
        }
        id
    }
}

impl<T: Clone + Sum<T>> WindowSnapshot<T> {
    /// Total over every bucket at the time of the snapshot.
    pub fn sum(&self) -> T {
        self.buckets.iter().cloned().sum()
    }
}

impl<T> WindowSnapshot<T> {
    /// Value of bucket `id` at the time of the snapshot.
    pub fn get(&self, id: BucketId) -> Option<&T> {
        let window = self.window.as_ref()?;
        if !window.contains(&id) {
            return None;
        }
        self.buckets.get((id - window.start()) as usize)
    }
}

impl<T, Z: ZeroValue<T>> TryFrom<BucketWindowConfig> for BucketWindowCore<T, Z>
where
    Z: Default,
{
    type Error = crate::error::ConfigError;

    /// Validates `config` and builds a window with the default zero producer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use bucket_window_core::{BucketWindowConfig, BucketWindowCore, ConfigError};
    ///
    /// let window: BucketWindowCore = BucketWindowConfig::new(10, Duration::from_secs(1))
    ///     .try_into()
    ///     .unwrap();
    /// assert_eq!(window.count(), 10);
    ///
    /// let rejected: Result<BucketWindowCore, _> =
    ///     BucketWindowCore::try_from(BucketWindowConfig::new(0, Duration::from_secs(1)));
    /// assert_eq!(rejected.err(), Some(ConfigError::ZeroCount));
    /// ```
    fn try_from(config: BucketWindowConfig) -> ConfigResult<Self> {
        BucketWindowCore::from_config_with_zero(config, Z::default())
    }
}

impl<T: Debug, Z> Debug for BucketWindowCore<T, Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        f.debug_struct("BucketWindowCore")
            .field("count", &self.count)
            .field("interval", &self.interval)
            .field("window", &state.meta.window())
            .field("buckets", &state.buckets)
            .finish()
    }
}

/// Timestamp already converted to nanoseconds.
#[derive(Clone, Copy)]
struct Nanos(i128);

impl UnixNanos for Nanos {
    #[inline]
    fn unix_nanos(&self) -> i128 {
        self.0
    }
}
