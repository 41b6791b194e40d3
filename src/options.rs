// src/options.rs

//! Per-call configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::dag::{GraphBuilder, Registration};
use crate::errors::{GraphError, GroupError};
use crate::logging::{GroupLogger, TracingLogger};
use crate::task::{Task, TaskId};

/// Label used in logs when no prefix is configured.
pub const DEFAULT_PREFIX: &str = "anonymous";

/// Options for [`crate::go`] and [`crate::try_go`].
///
/// ```
/// use std::time::Duration;
/// use depgroup::Options;
///
/// let opts = Options::new()
///     .with_prefix("ingest")
///     .with_limit(8)
///     .with_timeout(Duration::from_secs(2))
///     .with_logging();
/// assert_eq!(opts.limit(), 8);
/// ```
#[derive(Clone)]
pub struct Options {
    pub(crate) prefix: String,
    pub(crate) limit: usize,
    pub(crate) timeout: Option<Duration>,
    pub(crate) errors: Option<mpsc::Sender<GroupError>>,
    pub(crate) logging: bool,
    pub(crate) logger: Arc<dyn GroupLogger>,
    pub(crate) graph: Option<GraphBuilder>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            limit: 0,
            timeout: None,
            errors: None,
            logging: false,
            logger: Arc::new(TracingLogger),
            graph: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("prefix", &self.prefix)
            .field("limit", &self.limit)
            .field("timeout", &self.timeout)
            .field("error_collector", &self.errors.is_some())
            .field("logging", &self.logging)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group label used in logs. Empty means [`DEFAULT_PREFIX`].
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Maximum number of tasks running at once. `0` means one slot per task.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Deadline for the whole call. A zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Receive one error per failing task.
    ///
    /// Sends wait for capacity, so the receiver must be drained while the
    /// group runs or the failing task stalls.
    pub fn with_error_collector(mut self, errors: mpsc::Sender<GroupError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Emit group and task events through the configured logger.
    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// Replace the default [`TracingLogger`] and enable logging.
    pub fn with_logger(mut self, logger: Arc<dyn GroupLogger>) -> Self {
        self.logger = logger;
        self.logging = true;
        self
    }

    /// Enable task registration and dependency ordering.
    pub fn with_dependency_tracking(mut self) -> Self {
        self.graph.get_or_insert_with(GraphBuilder::new);
        self
    }

    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            &self.prefix
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    pub fn dependency_tracking(&self) -> bool {
        self.graph.is_some()
    }

    pub fn graph(&self) -> Option<&GraphBuilder> {
        self.graph.as_ref()
    }

    /// Start registering `task` in the dependency graph.
    ///
    /// # Panics
    ///
    /// Panics if dependency tracking is not enabled.
    pub fn task(&mut self, task: &Task) -> Registration<'_> {
        self.task_id(task.id())
    }

    /// Same as [`Options::task`], by id.
    ///
    /// # Panics
    ///
    /// Panics if dependency tracking is not enabled.
    pub fn task_id(&mut self, id: TaskId) -> Registration<'_> {
        match self.graph.as_mut() {
            Some(graph) => graph.task(id),
            None => panic!("dependency tracking not enabled"),
        }
    }

    /// Validate the dependency graph without panicking. `Ok` when
    /// dependency tracking is disabled.
    pub fn validate_dependencies(&self) -> Result<(), GraphError> {
        match &self.graph {
            Some(graph) => graph.verify(false),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::new();
        assert_eq!(opts.prefix(), "anonymous");
        assert_eq!(opts.limit(), 0);
        assert_eq!(opts.timeout(), None);
        assert!(!opts.logging_enabled());
        assert!(!opts.dependency_tracking());
    }

    #[test]
    fn zero_timeout_means_none() {
        let opts = Options::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::ZERO);
        assert_eq!(opts.timeout(), None);
    }

    #[test]
    fn logger_enables_logging() {
        let opts = Options::new().with_logger(Arc::new(TracingLogger));
        assert!(opts.logging_enabled());
    }

    #[test]
    #[should_panic(expected = "dependency tracking not enabled")]
    fn registration_requires_tracking() {
        let task = Task::new(|| async { Ok(()) });
        let mut opts = Options::new();
        opts.task(&task).register("a");
    }

    #[test]
    fn validate_dependencies_reports_without_panicking() {
        let a = Task::new(|| async { Ok(()) });
        let b = Task::new(|| async { Ok(()) });
        let mut opts = Options::new().with_dependency_tracking();
        opts.task(&a).register("a").depends_on(["b"]);
        opts.task(&b).register("b").depends_on(["a"]);

        let first = opts.validate_dependencies().unwrap_err();
        let second = opts.validate_dependencies().unwrap_err();
        assert!(matches!(first, GraphError::Cycle(_)));
        assert!(matches!(second, GraphError::Cycle(_)));
        assert!(Options::new().validate_dependencies().is_ok());
    }
}
