#![allow(dead_code)]

use std::time::Duration;

pub use depgroup_test_utils::{Recorder, RecordingLogger, init_tracing, with_timeout};

/// Base unit for timing tests. Large enough to absorb scheduler jitter on a
/// loaded CI machine.
pub const UNIT: Duration = Duration::from_millis(60);

pub fn units(n: u32) -> Duration {
    UNIT * n
}

/// Assert `actual` lies in `[low, high)`.
pub fn assert_within(actual: Duration, low: Duration, high: Duration) {
    assert!(
        actual >= low && actual < high,
        "expected {actual:?} to be within [{low:?}, {high:?})"
    );
}
