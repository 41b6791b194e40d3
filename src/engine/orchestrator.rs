// src/engine/orchestrator.rs

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dag::DepGraph;
use crate::errors::{GroupError, Result};
use crate::exec::group::Group;
use crate::exec::scheduler::DependencyScheduler;
use crate::exec::scope::Scope;
use crate::exec::{Admission, RunContext, plain};
use crate::logging::GroupEvent;
use crate::options::Options;
use crate::task::Task;

/// Run every task concurrently and wait for them.
///
/// Waits for a free slot before each submission when a limit is set. With
/// dependency tracking enabled, registered tasks start only after their
/// dependencies have finished; everything else runs as soon as it gets a
/// slot.
///
/// Returns the first task error, [`GroupError::Canceled`] if `ctx` is
/// cancelled while a timeout is configured, or [`GroupError::Timeout`] when
/// the timeout elapses first.
pub async fn go(ctx: &CancellationToken, opts: Option<&Options>, tasks: Vec<Task>) -> Result<()> {
    submit(ctx, opts, tasks, Admission::Blocking).await.1
}

/// Like [`go`], but a task is only started if a slot is free at submission
/// time. The flag is `false` if any task was turned away; admitted tasks
/// still run to completion and their outcome is returned alongside.
pub async fn try_go(
    ctx: &CancellationToken,
    opts: Option<&Options>,
    tasks: Vec<Task>,
) -> (bool, Result<()>) {
    submit(ctx, opts, tasks, Admission::BestEffort).await
}

/// Validated split of the submitted tasks.
struct Plan {
    graph: Option<DepGraph>,
    graph_tasks: Vec<Task>,
    plain_tasks: Vec<Task>,
    limit: usize,
}

impl Plan {
    fn build(opts: &Options, tasks: Vec<Task>) -> Result<Self> {
        let graph = match &opts.graph {
            Some(builder) => Some(builder.compile()?),
            None => None,
        };

        let Some(graph) = graph else {
            return Ok(Self {
                graph: None,
                graph_tasks: Vec::new(),
                limit: effective_limit(opts.limit, tasks.len()),
                plain_tasks: tasks,
            });
        };

        if opts.limit > 0 && opts.limit < graph.len() {
            return Err(GroupError::Config(
                "limit cannot be less than the number of tasks with dependencies".to_string(),
            ));
        }

        let submitted: HashSet<_> = tasks.iter().map(Task::id).collect();
        for (id, descriptor) in graph.nodes() {
            if !submitted.contains(&id) {
                let fallback = id.to_string();
                return Err(GroupError::Config(format!(
                    "registered task {:?} was not submitted",
                    descriptor.display_name(&fallback)
                )));
            }
        }

        let limit = effective_limit(opts.limit, tasks.len());
        let (graph_tasks, plain_tasks) = tasks.into_iter().partition(|t| graph.contains(t.id()));

        Ok(Self {
            graph: Some(graph),
            graph_tasks,
            plain_tasks,
            limit,
        })
    }
}

fn effective_limit(limit: usize, tasks: usize) -> usize {
    if limit == 0 { tasks } else { limit }
}

fn method_label(admission: Admission, tracking: bool) -> &'static str {
    match (admission, tracking) {
        (Admission::Blocking, false) => "Go",
        (Admission::Blocking, true) => "Go | Dep",
        (Admission::BestEffort, false) => "TryGo",
        (Admission::BestEffort, true) => "TryGo | Dep",
    }
}

async fn submit(
    ctx: &CancellationToken,
    opts: Option<&Options>,
    tasks: Vec<Task>,
    admission: Admission,
) -> (bool, Result<()>) {
    if tasks.is_empty() {
        return (true, Ok(()));
    }

    let defaults;
    let opts = match opts {
        Some(opts) => opts,
        None => {
            defaults = Options::new();
            &defaults
        }
    };

    let plan = match Plan::build(opts, tasks) {
        Ok(plan) => plan,
        Err(err) => {
            debug!(error = %err, "group rejected before start");
            return (false, Err(err));
        }
    };

    let run = Arc::new(RunContext {
        method: method_label(admission, opts.dependency_tracking()),
        prefix: opts.prefix().to_string(),
        logging: opts.logging,
        logger: opts.logger.clone(),
        errors: opts.errors.clone(),
    });

    let start = Instant::now();
    if run.logging {
        run.logger.record(&GroupEvent::GroupStarted {
            method: run.method,
            prefix: &run.prefix,
        });
    }

    debug!(
        method = run.method,
        prefix = %run.prefix,
        graph_tasks = plan.graph_tasks.len(),
        plain_tasks = plan.plain_tasks.len(),
        limit = plan.limit,
        "starting group"
    );

    let scope = Scope::new(ctx);
    let mut group = Group::new(scope.clone(), plan.limit);
    let scheduler = plan
        .graph
        .as_ref()
        .map(|graph| DependencyScheduler::new(graph, plan.graph_tasks, &group, run.clone()));
    let plain_tasks = plan.plain_tasks;

    let mut admitted = true;
    let work: BoxFuture<'static, Result<()>> = match admission {
        Admission::BestEffort => {
            admitted = launch(&mut group, scheduler, &run, plain_tasks, admission).await;
            group.wait().boxed()
        }
        Admission::Blocking => {
            let run = run.clone();
            async move {
                launch(&mut group, scheduler, &run, plain_tasks, admission).await;
                group.wait().await
            }
            .boxed()
        }
    };

    let result = match opts.timeout {
        Some(after) => race(ctx, &scope, &run, after, work).await,
        None => work.await,
    };

    if run.logging {
        run.logger.record(&GroupEvent::GroupDone {
            method: run.method,
            prefix: &run.prefix,
            elapsed: start.elapsed(),
            error: result.as_ref().err(),
        });
    }

    (admitted, result)
}

/// Graph workers first, then plain tasks.
async fn launch(
    group: &mut Group,
    scheduler: Option<DependencyScheduler>,
    run: &Arc<RunContext>,
    plain_tasks: Vec<Task>,
    admission: Admission,
) -> bool {
    let mut admitted = true;
    if let Some(scheduler) = scheduler {
        admitted &= scheduler.launch(group, admission).await;
    }
    admitted &= plain::launch(group, run, plain_tasks, admission).await;
    admitted
}

/// Caller cancellation beats the deadline, which beats completion.
async fn race(
    ctx: &CancellationToken,
    scope: &Scope,
    run: &RunContext,
    after: Duration,
    work: BoxFuture<'static, Result<()>>,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            info!(prefix = %run.prefix, "group cancelled by caller");
            Err(GroupError::Canceled)
        }
        _ = tokio::time::sleep(after) => {
            scope.expire();
            if run.logging {
                run.logger.record(&GroupEvent::GroupTimeout {
                    method: run.method,
                    prefix: &run.prefix,
                    after,
                });
            }
            Err(GroupError::Timeout { after })
        }
        res = work => res,
    }
}
