// src/exec/mod.rs

//! Execution layer.
//!
//! - [`group`] is the bounded concurrent group both paths submit to.
//! - [`scope`] holds the caller / deadline / failure cancellation state.
//! - [`safe`] runs a task body with panic recovery.
//! - [`plain`] runs tasks that have no ordering constraints.
//! - [`scheduler`] runs graph tasks, each waiting on its dependencies'
//!   completion signals.
//! - [`signal`] provides those one-shot signals.

pub(crate) mod group;
pub(crate) mod plain;
pub(crate) mod safe;
pub(crate) mod scheduler;
pub(crate) mod scope;
pub(crate) mod signal;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::errors::GroupError;
use crate::logging::{GroupEvent, GroupLogger};
use crate::task::TaskFn;

use self::safe::safe_run;

/// How workers are submitted to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Wait for a free slot (`go`).
    Blocking,
    /// Only take a slot that is free right now (`try_go`).
    BestEffort,
}

/// Per-call settings every worker needs once it runs a body.
pub(crate) struct RunContext {
    pub method: &'static str,
    pub prefix: String,
    pub logging: bool,
    pub logger: Arc<dyn GroupLogger>,
    pub errors: Option<mpsc::Sender<GroupError>>,
}

impl RunContext {
    /// Run a body through the safe wrapper, then report it.
    ///
    /// A failure is sent to the error collector (waiting for capacity) and
    /// logged when logging is enabled.
    pub async fn execute(&self, task: &str, body: TaskFn) -> Result<(), GroupError> {
        let start = Instant::now();
        let result = safe_run(task, body, self.logger.as_ref()).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => {
                if self.logging {
                    self.logger.record(&GroupEvent::TaskDone {
                        method: self.method,
                        prefix: &self.prefix,
                        task,
                        elapsed,
                    });
                }
            }
            Err(err) => {
                if let Some(tx) = &self.errors {
                    // A dropped receiver only means nobody is listening.
                    let _ = tx.send(err.clone()).await;
                }
                if self.logging {
                    self.logger.record(&GroupEvent::TaskFailed {
                        method: self.method,
                        prefix: &self.prefix,
                        task,
                        elapsed,
                        error: err,
                    });
                }
            }
        }

        result
    }
}
