// src/exec/group.rs

//! Bounded concurrent group shared by the plain and dependency paths.
//!
//! Every worker runs in its own Tokio task and holds a semaphore permit for
//! its whole lifetime. The first error is kept and cancels the shared
//! [`Scope`]. Handles are only awaited in [`Group::wait`]; dropping the group
//! detaches workers that are still running.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::GroupError;
use crate::exec::scope::Scope;

/// Records the first failure of a call and cancels the group.
#[derive(Debug, Clone)]
pub(crate) struct Failures {
    scope: Scope,
    first: Arc<OnceLock<GroupError>>,
}

impl Failures {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            first: Arc::new(OnceLock::new()),
        }
    }

    /// Idempotent: only the first reported error is kept.
    pub fn report(&self, err: GroupError) {
        if self.first.set(err).is_ok() {
            debug!("first group error recorded; cancelling group");
        }
        self.scope.fail();
    }

    pub fn first(&self) -> Option<GroupError> {
        self.first.get().cloned()
    }
}

#[derive(Debug)]
pub(crate) struct Group {
    scope: Scope,
    failures: Failures,
    semaphore: Arc<Semaphore>,
    handles: Vec<JoinHandle<()>>,
}

impl Group {
    /// `limit` is clamped to at least one slot.
    pub fn new(scope: Scope, limit: usize) -> Self {
        Self {
            failures: Failures::new(scope.clone()),
            scope,
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
            handles: Vec::new(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn failures(&self) -> &Failures {
        &self.failures
    }

    /// Submit a worker, waiting for a free slot.
    pub async fn spawn<F>(&mut self, worker: F)
    where
        F: Future<Output = Result<(), GroupError>> + Send + 'static,
    {
        match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => self.launch(permit, worker),
            Err(_) => {
                // The semaphore is never closed while the group is alive.
                warn!("concurrency limiter closed; dropping worker");
            }
        }
    }

    /// Submit a worker only if a slot is free right now.
    pub fn try_spawn<F>(&mut self, worker: F) -> bool
    where
        F: Future<Output = Result<(), GroupError>> + Send + 'static,
    {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                self.launch(permit, worker);
                true
            }
            Err(_) => false,
        }
    }

    fn launch<F>(&mut self, permit: OwnedSemaphorePermit, worker: F)
    where
        F: Future<Output = Result<(), GroupError>> + Send + 'static,
    {
        let failures = self.failures.clone();
        self.handles.push(tokio::spawn(async move {
            let _permit = permit;
            if let Err(err) = worker.await {
                failures.report(err);
            }
        }));
    }

    /// Wait for every submitted worker and return the first error.
    pub async fn wait(self) -> Result<(), GroupError> {
        for handle in self.handles {
            if let Err(join_err) = handle.await {
                // Bodies run under the safe wrapper, so this only happens if
                // the runtime is shutting down.
                self.failures.report(GroupError::Panicked {
                    task: "group worker".to_string(),
                    message: join_err.to_string(),
                });
            }
        }

        match self.failures.first() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
