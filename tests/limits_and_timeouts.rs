mod common;
use crate::common::{Recorder, RecordingLogger, assert_within, init_tracing, units, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use depgroup::{GroupError, Options, Task, go, try_go};
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn limit_below_graph_size_is_rejected() -> TestResult {
    let rec = Recorder::new();
    let tasks: Vec<Task> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| rec.task(name, units(0)))
        .collect();

    let mut opts = Options::new().with_dependency_tracking().with_limit(3);
    opts.task(&tasks[0]).register("a");
    opts.task(&tasks[1]).register("b").depends_on(["a"]);
    opts.task(&tasks[2]).register("c").depends_on(["a"]);
    opts.task(&tasks[3]).register("d").depends_on(["b", "c"]);

    let err = with_timeout(go(&CancellationToken::new(), Some(&opts), tasks))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "configuration error: limit cannot be less than the number of tasks with dependencies"
    );
    assert!(rec.start_order().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn limit_bounds_running_tasks() -> TestResult {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<Task> = (0..6)
        .map(|_| {
            let running = running.clone();
            let peak = peak.clone();
            Task::new(move || async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(units(1)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let opts = Options::new().with_limit(2);
    let start = Instant::now();
    with_timeout(go(&CancellationToken::new(), Some(&opts), tasks)).await?;

    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert!(start.elapsed() >= units(3));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timeout_wins_and_unstarted_dependents_never_run() -> TestResult {
    init_tracing();
    let rec = Recorder::new();
    let logger = Arc::new(RecordingLogger::new());

    let a = rec.task("a", units(1));
    let b = rec.task("b", units(4));
    let c = rec.task("c", units(1));
    let plain = rec.task("plain", units(4));

    let mut opts = Options::new()
        .with_dependency_tracking()
        .with_timeout(units(2))
        .with_prefix("nightly")
        .with_logger(logger.clone());
    opts.task(&a).register("a");
    opts.task(&b).register("b").depends_on(["a"]);
    opts.task(&c).register("c").depends_on(["b"]);

    let start = Instant::now();
    let err = with_timeout(go(&CancellationToken::new(), Some(&opts), vec![a, b, c, plain]))
        .await
        .unwrap_err();
    let returned = start.elapsed();

    assert!(matches!(err, GroupError::Timeout { after } if after == units(2)));
    assert_eq!(err.to_string(), "group timeout");
    assert!(err.is_timeout());
    assert_within(returned, units(2), units(3));

    // Running bodies are left to finish on their own.
    assert!(rec.started("plain"));
    assert!(!rec.finished("plain"));
    tokio::time::sleep(units(4)).await;
    assert!(rec.finished("plain"));
    assert!(rec.finished("b"));
    assert!(!rec.started("c"));

    let timeouts: Vec<_> = logger
        .events()
        .into_iter()
        .filter(|e| e.kind == "GroupTimeout")
        .collect();
    assert_eq!(timeouts.len(), 1);
    assert_eq!(timeouts[0].method.as_deref(), Some("Go | Dep"));
    assert_eq!(timeouts[0].prefix.as_deref(), Some("nightly"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timeout_stops_tasks_still_waiting_for_a_slot() -> TestResult {
    let rec = Recorder::new();
    let first = rec.task("first", units(3));
    let queued = rec.task("queued", units(0));

    let opts = Options::new().with_limit(1).with_timeout(units(1));
    let err = with_timeout(go(&CancellationToken::new(), Some(&opts), vec![first, queued]))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    tokio::time::sleep(units(3)).await;
    assert!(rec.finished("first"));
    assert!(!rec.started("queued"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completion_before_timeout_returns_ok() -> TestResult {
    let rec = Recorder::new();
    let opts = Options::new().with_timeout(Duration::from_secs(2));

    with_timeout(go(
        &CancellationToken::new(),
        Some(&opts),
        vec![rec.task("quick", units(1))],
    ))
    .await?;

    assert!(rec.finished("quick"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn try_go_reports_rejected_tasks_and_still_runs_the_graph() -> TestResult {
    let rec = Recorder::new();
    let logger = Arc::new(RecordingLogger::new());

    let a = rec.task("a", units(1));
    let b = rec.task("b", units(1));
    let c = rec.task("c", units(1));
    let d = rec.task("d", units(1));
    let extra1 = rec.task("extra1", units(0));
    let extra2 = rec.task("extra2", units(0));

    let mut opts = Options::new()
        .with_dependency_tracking()
        .with_limit(4)
        .with_logger(logger.clone());
    opts.task(&a).register("a");
    opts.task(&b).register("b").depends_on(["a"]);
    opts.task(&c).register("c").depends_on(["a"]);
    opts.task(&d).register("d").depends_on(["b", "c"]);

    let (admitted, result) = with_timeout(try_go(
        &CancellationToken::new(),
        Some(&opts),
        vec![extra1, a, b, c, d, extra2],
    ))
    .await;

    assert!(!admitted);
    result?;
    for name in ["a", "b", "c", "d"] {
        assert!(rec.finished(name), "{name} did not run");
    }
    assert!(!rec.started("extra1"));
    assert!(!rec.started("extra2"));
    assert!(rec.started_after("d", "b"));

    let kinds = logger.kinds();
    assert_eq!(kinds.first(), Some(&"GroupStarted"));
    assert_eq!(kinds.last(), Some(&"GroupDone"));
    assert_eq!(logger.events()[0].method.as_deref(), Some("TryGo | Dep"));
    Ok(())
}

#[tokio::test]
async fn try_go_with_room_admits_everything() -> TestResult {
    let rec = Recorder::new();
    let opts = Options::new().with_limit(3);

    let (admitted, result) = with_timeout(try_go(
        &CancellationToken::new(),
        Some(&opts),
        vec![rec.task("x", units(0)), rec.task("y", units(0))],
    ))
    .await;

    assert!(admitted);
    result?;
    assert!(rec.finished("x") && rec.finished("y"));
    Ok(())
}

#[tokio::test]
async fn empty_submission_is_a_no_op() -> TestResult {
    go(&CancellationToken::new(), None, Vec::new()).await?;
    let (admitted, result) = try_go(&CancellationToken::new(), None, Vec::new()).await;
    assert!(admitted);
    result?;
    Ok(())
}

#[tokio::test]
async fn without_options_every_task_runs_at_once() -> TestResult {
    let rec = Recorder::new();
    let tasks: Vec<Task> = (0..5)
        .map(|i| rec.task(&format!("t{i}"), units(1)))
        .collect();

    let start = Instant::now();
    with_timeout(go(&CancellationToken::new(), None, tasks)).await?;

    assert_within(start.elapsed(), units(1), units(2));
    assert_eq!(rec.start_order().len(), 5);
    Ok(())
}
