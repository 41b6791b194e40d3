// src/lib.rs

//! Dependency-aware concurrent task groups.
//!
//! Submit a batch of fallible tasks with [`go`] (wait for free slots) or
//! [`try_go`] (best effort). With [`Options::with_dependency_tracking`],
//! tasks can be named and declare dependencies on each other: a task starts
//! only after everything it depends on has finished, a failure fast-fails
//! its dependents unless the failed dependency was marked tolerant, and the
//! whole call honours an optional concurrency limit and timeout.
//!
//! ```no_run
//! use depgroup::{Options, Task, go};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), depgroup::GroupError> {
//! let fetch = Task::new(|| async { Ok(()) });
//! let parse = Task::new(|| async { Ok(()) });
//!
//! let mut opts = Options::new().with_dependency_tracking();
//! opts.task(&fetch).register("fetch");
//! opts.task(&parse).register("parse").depends_on(["fetch"]);
//!
//! go(&CancellationToken::new(), Some(&opts), vec![fetch, parse]).await
//! # }
//! ```

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub(crate) mod exec;
pub mod logging;
pub mod options;
pub mod task;

pub use dag::{DepGraph, Descriptor, GraphBuilder, Registration};
pub use engine::{go, try_go};
pub use errors::{ConfigError, GraphError, GroupError};
pub use logging::{GroupEvent, GroupLogger, TracingLogger};
pub use options::Options;
pub use task::{Task, TaskFuture, TaskId};
