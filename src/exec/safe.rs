// src/exec/safe.rs

//! Panic-safe invocation of task bodies.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::errors::GroupError;
use crate::logging::{GroupEvent, GroupLogger};
use crate::task::TaskFn;

/// Run `body`, turning a panic (in the call or while polling) into
/// [`GroupError::Panicked`] and a returned error into [`GroupError::Task`].
///
/// Panics are reported to `logger` together with a backtrace captured at the
/// recovery point.
pub(crate) async fn safe_run(task: &str, body: TaskFn, logger: &dyn GroupLogger) -> Result<(), GroupError> {
    let outcome = AssertUnwindSafe(async move { body().await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(GroupError::task(task, err)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let backtrace = Backtrace::force_capture();
            logger.record(&GroupEvent::TaskPanicked {
                task,
                message: &message,
                backtrace: &backtrace,
            });
            Err(GroupError::Panicked {
                task: task.to_string(),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
