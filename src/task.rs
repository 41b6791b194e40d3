// src/task.rs

//! Task bodies and their identities.
//!
//! A [`Task`] owns a zero-argument body that yields `anyhow::Result<()>`.
//! Its [`TaskId`] is minted when the task is created and is what the
//! dependency graph uses as a lookup key; it stays stable until the task is
//! consumed by a group call.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

/// Future produced by a task body.
pub type TaskFuture = BoxFuture<'static, anyhow::Result<()>>;

pub(crate) type TaskFn = Box<dyn FnOnce() -> TaskFuture + Send + 'static>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a [`Task`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A fallible operation with no inputs.
pub struct Task {
    id: TaskId,
    label: &'static str,
    body: TaskFn,
}

impl Task {
    /// Wrap an async body.
    ///
    /// ```
    /// use depgroup::Task;
    ///
    /// let task = Task::new(|| async { Ok(()) });
    /// assert!(task.label().contains("closure"));
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            id: TaskId::next(),
            label: std::any::type_name::<F>(),
            body: Box::new(move || f().boxed()),
        }
    }

    /// Wrap a synchronous body. It runs on tokio's blocking pool, so it may
    /// block on I/O or sleep without stalling other tasks.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            id: TaskId::next(),
            label: std::any::type_name::<F>(),
            body: Box::new(move || {
                async move {
                    match tokio::task::spawn_blocking(f).await {
                        Ok(result) => result,
                        // Re-raise so the safe wrapper sees the original payload.
                        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                        Err(err) => Err(anyhow::Error::new(err)),
                    }
                }
                .boxed()
            }),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Synthesized name used in logs for tasks that were never named.
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub(crate) fn into_body(self) -> TaskFn {
        self.body
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Task::new(|| async { Ok(()) });
        let b = Task::new(|| async { Ok(()) });
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn sync_body_runs_on_blocking_pool() {
        let task = Task::from_fn(|| anyhow::bail!("nope"));
        let err = (task.into_body())().await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
