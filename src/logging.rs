// src/logging.rs

//! Logging for `depgroup`.
//!
//! Group and task events go through a [`GroupLogger`] injected via
//! [`crate::Options::with_logger`]; the default [`TracingLogger`] turns them
//! into `tracing` events. Nothing here influences control flow.
//!
//! [`init_logging`] is a convenience for binaries and tests that want a
//! `tracing-subscriber` installed. Priority for the level:
//! 1. the `level` argument (if provided)
//! 2. `DEPGROUP_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`

use std::backtrace::Backtrace;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{error, info};
use tracing_subscriber::fmt;

use crate::errors::GroupError;

/// Structured events emitted while a group runs.
#[derive(Debug)]
pub enum GroupEvent<'a> {
    GroupStarted {
        method: &'a str,
        prefix: &'a str,
    },
    GroupDone {
        method: &'a str,
        prefix: &'a str,
        elapsed: Duration,
        error: Option<&'a GroupError>,
    },
    GroupTimeout {
        method: &'a str,
        prefix: &'a str,
        after: Duration,
    },
    TaskDone {
        method: &'a str,
        prefix: &'a str,
        task: &'a str,
        elapsed: Duration,
    },
    TaskFailed {
        method: &'a str,
        prefix: &'a str,
        task: &'a str,
        elapsed: Duration,
        error: &'a GroupError,
    },
    /// Reported whether or not logging is enabled.
    TaskPanicked {
        task: &'a str,
        message: &'a str,
        backtrace: &'a Backtrace,
    },
}

/// Receiver for [`GroupEvent`]s.
pub trait GroupLogger: Send + Sync {
    fn record(&self, event: &GroupEvent<'_>);
}

/// Default logger: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl GroupLogger for TracingLogger {
    fn record(&self, event: &GroupEvent<'_>) {
        match *event {
            GroupEvent::GroupStarted { method, prefix } => {
                info!(method, group = prefix, "group started");
            }
            GroupEvent::GroupDone {
                method,
                prefix,
                elapsed,
                error: None,
            } => {
                info!(method, group = prefix, ?elapsed, "group done");
            }
            GroupEvent::GroupDone {
                method,
                prefix,
                elapsed,
                error: Some(err),
            } => {
                error!(method, group = prefix, ?elapsed, error = %err, "group failed");
            }
            GroupEvent::GroupTimeout {
                method,
                prefix,
                after,
            } => {
                info!(method, group = prefix, ?after, "group timeout");
            }
            GroupEvent::TaskDone {
                method,
                prefix,
                task,
                elapsed,
            } => {
                info!(method, group = prefix, task, ?elapsed, "task done");
            }
            GroupEvent::TaskFailed {
                method,
                prefix,
                task,
                elapsed,
                error,
            } => {
                error!(method, group = prefix, task, ?elapsed, error = %error, "task failed");
            }
            GroupEvent::TaskPanicked {
                task,
                message,
                backtrace,
            } => {
                error!(task, panic = message, "runtime panic\n{backtrace}");
            }
        }
    }
}

/// Install a global `tracing-subscriber` writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(level: Option<tracing::Level>) -> Result<()> {
    let level = match level {
        Some(lvl) => lvl,
        None => std::env::var("DEPGROUP_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
