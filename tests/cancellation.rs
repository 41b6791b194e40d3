mod common;
use crate::common::{Recorder, assert_within, units, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use depgroup::{GroupError, Options, go, try_go};
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn caller_cancellation_beats_a_longer_timeout() -> TestResult {
    let rec = Recorder::new();
    let ctx = CancellationToken::new();

    let a = rec.task("a", units(4));
    let b = rec.task("b", units(1));

    let mut opts = Options::new()
        .with_dependency_tracking()
        .with_timeout(Duration::from_secs(3));
    opts.task(&a).register("a");
    opts.task(&b).register("b").depends_on(["a"]);

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(units(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = with_timeout(go(&ctx, Some(&opts), vec![a, b])).await.unwrap_err();

    assert!(matches!(err, GroupError::Canceled));
    assert!(err.is_canceled());
    assert_eq!(err.to_string(), "context canceled");
    assert_within(start.elapsed(), units(1), units(2));

    tokio::time::sleep(units(4)).await;
    assert!(rec.finished("a"));
    assert!(!rec.started("b"));
    Ok(())
}

#[tokio::test]
async fn already_cancelled_caller_runs_nothing() -> TestResult {
    let rec = Recorder::new();
    let ctx = CancellationToken::new();
    ctx.cancel();

    let err = with_timeout(go(&ctx, None, vec![rec.task("x", units(0))]))
        .await
        .unwrap_err();
    assert!(err.is_canceled());

    let opts = Options::new().with_timeout(Duration::from_secs(1));
    let (_, result) = with_timeout(try_go(&ctx, Some(&opts), vec![rec.task("y", units(0))])).await;
    assert!(result.is_err_and(|e| e.is_canceled()));

    tokio::task::yield_now().await;
    assert!(rec.start_order().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancellation_without_timeout_waits_for_running_bodies() -> TestResult {
    let rec = Recorder::new();
    let ctx = CancellationToken::new();

    let running = rec.task("running", units(2));
    let waiting = rec.task("waiting", units(0));

    let mut opts = Options::new().with_dependency_tracking();
    opts.task(&running).register("running");
    opts.task(&waiting).register("waiting").depends_on(["running"]);

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(units(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = with_timeout(go(&ctx, Some(&opts), vec![running, waiting]))
        .await
        .unwrap_err();

    // The dependent aborts as soon as the caller cancels; the group still
    // waits for the running body before returning.
    assert!(err.is_canceled());
    assert!(rec.finished("running"));
    assert!(!rec.started("waiting"));
    assert!(start.elapsed() >= units(2));
    Ok(())
}
