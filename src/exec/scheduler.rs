// src/exec/scheduler.rs

//! Dependency-aware execution of graph tasks.
//!
//! There is no precomputed topological order: every node gets its own worker
//! which waits directly on its dependencies' [`CompletionSignal`]s and
//! publishes its own signal on every exit path.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::dag::{DepGraph, Descriptor, NodeState};
use crate::errors::GroupError;
use crate::exec::group::{Failures, Group};
use crate::exec::scope::Scope;
use crate::exec::signal::{CompletionSignal, PublishGuard};
use crate::exec::{Admission, RunContext};
use crate::task::Task;

/// Workers for every node of a compiled graph.
pub(crate) struct DependencyScheduler {
    shared: Arc<Shared>,
    nodes: Vec<(Descriptor, Task)>,
}

/// State shared by all node workers of one call.
struct Shared {
    scope: Scope,
    failures: Failures,
    run: Arc<RunContext>,
    signals: HashMap<String, Arc<CompletionSignal>>,
    /// Add-only during execution: a worker only ever inserts its own name.
    tolerant: RwLock<HashSet<String>>,
}

impl Shared {
    fn is_tolerant(&self, name: &str) -> bool {
        self.tolerant
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    fn tolerate(&self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.tolerant
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
    }
}

impl DependencyScheduler {
    /// `tasks` are the submitted tasks that belong to `graph`; anything else
    /// is ignored.
    pub fn new(graph: &DepGraph, tasks: Vec<Task>, group: &Group, run: Arc<RunContext>) -> Self {
        let signals = graph
            .tasks()
            .map(|name| (name.to_string(), Arc::new(CompletionSignal::new())))
            .collect();

        let nodes = tasks
            .into_iter()
            .filter_map(|task| {
                let descriptor = graph.descriptor(task.id())?.clone();
                Some((descriptor, task))
            })
            .collect();

        let shared = Shared {
            scope: group.scope().clone(),
            failures: group.failures().clone(),
            run,
            signals,
            tolerant: RwLock::new(graph.tolerant().clone()),
        };

        Self {
            shared: Arc::new(shared),
            nodes,
        }
    }

    /// Submit one worker per node. Returns whether all were admitted.
    pub async fn launch(self, group: &mut Group, admission: Admission) -> bool {
        let mut admitted = true;

        for (descriptor, task) in self.nodes {
            let signal = if descriptor.is_anonymous() {
                None
            } else {
                self.shared.signals.get(&descriptor.name).cloned()
            };
            // Built outside the worker so a rejected or dropped worker still
            // publishes.
            let guard = PublishGuard::new(signal);
            let worker = run_node(self.shared.clone(), descriptor, task, guard);

            match admission {
                Admission::Blocking => group.spawn(worker).await,
                Admission::BestEffort => admitted &= group.try_spawn(worker),
            }
        }

        admitted
    }
}

async fn run_node(
    shared: Arc<Shared>,
    descriptor: Descriptor,
    task: Task,
    guard: PublishGuard,
) -> Result<(), GroupError> {
    let name = descriptor.display_name(task.label()).to_string();
    let result = drive(&shared, &descriptor, &name, task).await;

    if let Err(err) = &result {
        guard.record_failure(err.to_string());
        // Cancel the group before the signal fires so dependents observe it.
        shared.failures.report(err.clone());
    }
    drop(guard);

    result
}

async fn drive(shared: &Shared, descriptor: &Descriptor, name: &str, task: Task) -> Result<(), GroupError> {
    transition(name, NodeState::Pending);
    // A sibling failure is judged per edge below, where tolerance applies.
    let early = if descriptor.depends_on.is_empty() {
        shared.scope.done()
    } else {
        shared.scope.fatal()
    };
    if let Some(err) = early {
        debug!(task = name, error = %err, "group already done; not starting");
        transition(name, NodeState::Aborted);
        return Err(err);
    }

    let mut markers = Vec::new();
    if !descriptor.depends_on.is_empty() {
        transition(name, NodeState::WaitingOnDeps);
    }

    for dep in &descriptor.depends_on {
        let Some(signal) = shared.signals.get(dep) else {
            transition(name, NodeState::Aborted);
            return Err(GroupError::MissingSignal(dep.clone()));
        };

        tokio::select! {
            _ = signal.wait() => {}
            _ = shared.scope.fatal_cancelled() => {}
        }
        trace!(task = name, dependency = %dep, fired = signal.has_fired(), "dependency wait over");

        if let Some(err) = shared.scope.fatal() {
            transition(name, NodeState::Aborted);
            return Err(err);
        }

        if shared.scope.is_failed() {
            if !shared.is_tolerant(dep) {
                debug!(task = name, dependency = %dep, "group failed; fast-failing");
                transition(name, NodeState::Aborted);
                return Err(GroupError::GroupCanceled);
            }

            debug!(task = name, dependency = %dep, "tolerating upstream failure");
            shared.tolerate(&descriptor.name);
            let reason = match signal.failure() {
                Some(text) => text.to_string(),
                None => GroupError::GroupCanceled.to_string(),
            };
            markers.push(GroupError::Tolerated {
                dependency: dep.clone(),
                reason,
            });
        }
    }

    transition(name, NodeState::Running);
    let own = shared.run.execute(name, task.into_body()).await.err();
    transition(name, NodeState::Done);

    match GroupError::join(own, markers) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn transition(task: &str, state: NodeState) {
    trace!(task, ?state, terminal = state.is_terminal(), "node state");
}
