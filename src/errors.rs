// src/errors.rs

//! Crate-wide error types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Structural problem found in a dependency graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate dependency source {0:?}")]
    DuplicateSource(String),

    #[error("missing dependency {0:?}")]
    MissingDependency(String),

    /// The chain starts and ends with the same task name.
    #[error("dependency cycle detected: {}", render_chain(.0))]
    Cycle(Vec<String>),
}

fn render_chain(chain: &[String]) -> String {
    chain
        .iter()
        .map(|name| format!("{name:?}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Everything a group call can fail with.
///
/// Cloneable so the first error can be both stored by the group and
/// forwarded to an error collector.
#[derive(Error, Debug, Clone)]
pub enum GroupError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{task} failed: {cause:#}")]
    Task {
        task: String,
        cause: Arc<anyhow::Error>,
    },

    #[error("{task} panicked: {message}")]
    Panicked { task: String, message: String },

    #[error("missing dependency signal for {0:?}")]
    MissingSignal(String),

    /// The caller's cancellation token fired.
    #[error("context canceled")]
    Canceled,

    /// A task was aborted because the group deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Call-level result when the configured timeout elapsed.
    #[error("group timeout")]
    Timeout { after: Duration },

    /// A task was aborted because a sibling failed.
    #[error("group canceled after a task failed")]
    GroupCanceled,

    /// A tolerant upstream failed; the dependent ran anyway.
    #[error("tolerated failure of dependency {dependency:?}: {reason}")]
    Tolerated { dependency: String, reason: String },

    #[error("{}", JoinedDisplay(.0))]
    Joined(Vec<GroupError>),
}

struct JoinedDisplay<'a>(&'a [GroupError]);

impl fmt::Display for JoinedDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl GroupError {
    pub(crate) fn task(task: impl Into<String>, cause: anyhow::Error) -> Self {
        GroupError::Task {
            task: task.into(),
            cause: Arc::new(cause),
        }
    }

    /// Combine a task's own result with the markers of tolerated upstream
    /// failures. Neither side is dropped.
    pub(crate) fn join(own: Option<GroupError>, markers: Vec<GroupError>) -> Option<GroupError> {
        let mut all: Vec<GroupError> = own.into_iter().chain(markers).collect();
        match all.len() {
            0 => None,
            1 => all.pop(),
            _ => Some(GroupError::Joined(all)),
        }
    }

    /// `true` if this is, or contains, the caller's cancellation.
    pub fn is_canceled(&self) -> bool {
        self.any(|e| matches!(e, GroupError::Canceled))
    }

    /// `true` for the call-level timeout and for per-task deadline aborts.
    pub fn is_timeout(&self) -> bool {
        self.any(|e| matches!(e, GroupError::Timeout { .. } | GroupError::DeadlineExceeded))
    }

    /// The error returned by a task body, if this error carries one.
    pub fn task_error(&self) -> Option<&anyhow::Error> {
        match self {
            GroupError::Task { cause, .. } => Some(cause.as_ref()),
            GroupError::Joined(errs) => errs.iter().find_map(GroupError::task_error),
            _ => None,
        }
    }

    fn any(&self, pred: impl Fn(&GroupError) -> bool + Copy) -> bool {
        match self {
            GroupError::Joined(errs) => errs.iter().any(|e| e.any(pred)),
            other => pred(other),
        }
    }
}

/// Errors raised while loading [`crate::config::GroupSettings`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, GroupError>;
