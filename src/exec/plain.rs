// src/exec/plain.rs

//! Tasks without ordering constraints.

use std::sync::Arc;

use crate::errors::GroupError;
use crate::exec::group::Group;
use crate::exec::scope::Scope;
use crate::exec::{Admission, RunContext};
use crate::task::Task;

/// Submit every task to `group`. Returns whether all were admitted, which is
/// always the case in [`Admission::Blocking`] mode.
///
/// Each worker checks the scope before running and short-circuits with the
/// cancellation condition if it is already done.
pub(crate) async fn launch(
    group: &mut Group,
    run: &Arc<RunContext>,
    tasks: Vec<Task>,
    admission: Admission,
) -> bool {
    let mut admitted = true;

    for task in tasks {
        let worker = worker(group.scope().clone(), run.clone(), task);
        match admission {
            Admission::Blocking => group.spawn(worker).await,
            Admission::BestEffort => admitted &= group.try_spawn(worker),
        }
    }

    admitted
}

async fn worker(scope: Scope, run: Arc<RunContext>, task: Task) -> Result<(), GroupError> {
    if let Some(err) = scope.done() {
        return Err(err);
    }
    let label = task.label();
    run.execute(label, task.into_body()).await
}
