use std::cell::Cell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bucket_window_core::buckets::{advance, time_to_bucket_id, Advance, BucketsMeta};
use bucket_window_core::{BucketId, DefaultZero};

const SECOND: Duration = Duration::from_secs(1);

fn base_time() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_707_733_230)
}

fn id(t: SystemTime) -> BucketId {
    time_to_bucket_id(t, SECOND)
}

fn zero() -> i64 {
    0
}

#[test]
fn test_first_advance_anchors_window() {
    let ts = base_time();
    let mut meta = BucketsMeta::new(3, SECOND);
    let mut store = vec![1_i64, 2, 3];

    let outcome = advance(&mut store, &mut meta, &zero, ts);

    assert_eq!(outcome, Advance::Initialized);
    assert_eq!(store, vec![1, 2, 3]);
    assert_eq!(meta.min_id(), Some(id(ts) - 2));
    assert_eq!(meta.max_id(), Some(id(ts)));
}

#[test]
fn test_current_bucket_already_covered() {
    let ts = base_time();
    let mut meta = BucketsMeta::with_window(3, SECOND, id(ts));
    let mut store = vec![1_i64, 2, 3];

    let outcome = advance(&mut store, &mut meta, &zero, ts);

    assert_eq!(outcome, Advance::Unchanged);
    assert_eq!(store, vec![1, 2, 3]);
    assert_eq!(meta.min_id(), Some(id(ts)));
    assert_eq!(meta.max_id(), Some(id(ts) + 2));
}

#[test]
fn test_slide_moves_surviving_buckets() {
    let ts = base_time();
    let mut meta = BucketsMeta::with_window(3, SECOND, id(ts));
    let mut store = vec![1_i64, 2, 3];

    let outcome = advance(&mut store, &mut meta, &zero, ts + 4 * SECOND);

    assert_eq!(outcome, Advance::Slid { shift: 2 });
    assert_eq!(store, vec![3, 0, 0]);
    assert_eq!(meta.min_id(), Some(id(ts + 2 * SECOND)));
    assert_eq!(meta.max_id(), Some(id(ts + 4 * SECOND)));
}

#[test]
fn test_slide_by_one() {
    let mut meta = BucketsMeta::with_window(4, SECOND, 10);
    let mut store = vec![1_i64, 2, 3, 4];

    advance(&mut store, &mut meta, &zero, Duration::from_secs(14));

    assert_eq!(store, vec![2, 3, 4, 0]);
    assert_eq!(meta.window(), Some(11..=14));
}

#[test]
fn test_advance_is_idempotent() {
    let now = base_time() + Duration::from_millis(4_321);
    let mut meta = BucketsMeta::with_window(5, SECOND, id(base_time()));
    let mut store = vec![5_i64, 4, 3, 2, 1];

    advance(&mut store, &mut meta, &zero, now);
    let (store_once, meta_once) = (store.clone(), meta.clone());

    assert_eq!(advance(&mut store, &mut meta, &zero, now), Advance::Unchanged);
    assert_eq!(store, store_once);
    assert_eq!(meta, meta_once);
}

#[test]
fn test_first_advance_is_idempotent() {
    let mut meta = BucketsMeta::new(3, SECOND);
    let mut store = vec![0_i64; 3];

    assert_eq!(advance(&mut store, &mut meta, &zero, base_time()), Advance::Initialized);
    assert_eq!(advance(&mut store, &mut meta, &zero, base_time()), Advance::Unchanged);
    assert_eq!(meta.max_id(), Some(id(base_time())));
}

#[test]
fn test_clock_regression_is_ignored() {
    let ts = base_time();
    let mut meta = BucketsMeta::with_window(3, SECOND, id(ts));
    let mut store = vec![1_i64, 2, 3];

    assert_eq!(advance(&mut store, &mut meta, &zero, ts - 60 * SECOND), Advance::Unchanged);
    assert_eq!(store, vec![1, 2, 3]);
    assert_eq!(meta.min_id(), Some(id(ts)));
}

#[test]
fn test_slide_by_exactly_count_resets_everything() {
    let mut meta = BucketsMeta::with_window(3, SECOND, 10);
    let mut store = vec![7_i64, 8, 9];

    let outcome = advance(&mut store, &mut meta, &zero, Duration::from_secs(15));

    assert_eq!(outcome, Advance::Slid { shift: 3 });
    assert_eq!(store, vec![0, 0, 0]);
    assert_eq!(meta.window(), Some(13..=15));
}

#[test]
fn test_long_idle_resets_everything() {
    let mut meta = BucketsMeta::with_window(4, SECOND, 10);
    let mut store = vec![1_i64, 1, 1, 1];

    let outcome = advance(&mut store, &mut meta, &zero, Duration::from_secs(100_000));

    assert_eq!(outcome, Advance::Slid { shift: 100_000 - 13 });
    assert_eq!(store, vec![0; 4]);
    assert_eq!(meta.window(), Some(99_997..=100_000));
}

#[test]
fn test_window_span_survives_every_step() {
    let count = 7;
    let mut meta = BucketsMeta::new(count, Duration::from_millis(100));
    let mut store = vec![0_u64; count];

    for step in [0_u64, 50, 120, 120, 90, 700, 701, 5_000, 5_350, 5_351] {
        advance(&mut store, &mut meta, &DefaultZero, Duration::from_millis(1_000_000 + step));
        let window = meta.window().unwrap();
        assert_eq!(window.end() - window.start(), count as BucketId - 1);
        assert_eq!(store.len(), count);
    }
}

#[test]
fn test_custom_zero_value_fills_vacated_slots() {
    let mut meta = BucketsMeta::with_window(3, SECOND, 10);
    let mut store = vec![Some(1_u32), Some(2), Some(3)];

    advance(&mut store, &mut meta, &|| None, Duration::from_secs(13));

    assert_eq!(store, vec![None, None, None]);

    let mut store = vec![-1_i8, -2, -3];
    let mut meta = BucketsMeta::with_window(3, SECOND, 10);
    advance(&mut store, &mut meta, &|| -100_i8, Duration::from_secs(13));
    assert_eq!(store, vec![-100; 3]);
}

#[test]
fn test_zero_value_only_consulted_when_sliding() {
    let calls = Cell::new(0);
    let counting_zero = || {
        calls.set(calls.get() + 1);
        0_i64
    };
    let mut meta = BucketsMeta::new(3, SECOND);
    let mut store = vec![0_i64; 3];

    advance(&mut store, &mut meta, &counting_zero, Duration::from_secs(10));
    advance(&mut store, &mut meta, &counting_zero, Duration::from_secs(10));
    assert_eq!(calls.get(), 0);

    advance(&mut store, &mut meta, &counting_zero, Duration::from_secs(11));
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_non_copy_counters_move_with_window() {
    let mut meta = BucketsMeta::with_window(3, SECOND, 0);
    let mut store = vec![vec![1_u8], vec![2], vec![3]];

    advance(&mut store, &mut meta, &Vec::new, Duration::from_secs(4));

    assert_eq!(store, vec![vec![3], vec![], vec![]]);
}

#[test]
fn test_first_advance_at_largest_id() {
    let mut meta = BucketsMeta::new(3, Duration::from_nanos(1));
    let mut store = vec![0_i64; 3];

    let outcome = advance(&mut store, &mut meta, &zero, Duration::from_nanos(1 << 63));

    assert_eq!(outcome, Advance::Initialized);
    assert_eq!(meta.window(), Some(i64::MAX - 2..=i64::MAX));
}

#[test]
fn test_first_advance_at_smallest_id_keeps_span() {
    let mut meta = BucketsMeta::new(3, Duration::from_nanos(1));
    let mut store = vec![0_i64; 3];

    advance(&mut store, &mut meta, &zero, i64::MIN);

    assert_eq!(meta.window(), Some(i64::MIN..=i64::MIN + 2));
    assert_eq!(meta.locate(i64::MIN), i64::MIN);
}

#[test]
fn test_slide_across_whole_id_range_resets() {
    let mut meta = BucketsMeta::new(3, Duration::from_nanos(1));
    let mut store = vec![0_i64; 3];
    advance(&mut store, &mut meta, &zero, i64::MIN);
    store[2] = 9;

    let outcome = advance(&mut store, &mut meta, &zero, i64::MAX);

    assert_eq!(outcome, Advance::Slid { shift: i64::MAX });
    assert_eq!(store, vec![0, 0, 0]);
    assert_eq!(meta.window(), Some(i64::MAX - 2..=i64::MAX));
}

#[test]
fn test_with_window_near_largest_id_keeps_span() {
    let meta = BucketsMeta::with_window(4, SECOND, i64::MAX - 1);
    let window = meta.window().unwrap();
    assert_eq!(window.end() - window.start(), 3);
    assert_eq!(*window.end(), i64::MAX);
}
