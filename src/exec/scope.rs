// src/exec/scope.rs

//! Shared cancellation state for one group call.

use tokio_util::sync::CancellationToken;

use crate::errors::GroupError;

/// The three cancellation sources of a call.
///
/// - `caller`: the token handed to `go` / `try_go`. Always fatal.
/// - `deadline`: fired when the configured timeout elapses. Always fatal.
/// - `group`: child of `caller`; also fired on the first task failure and on
///   deadline expiry. A failure cancellation alone is tolerable per edge.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    caller: CancellationToken,
    group: CancellationToken,
    deadline: CancellationToken,
}

impl Scope {
    pub fn new(caller: &CancellationToken) -> Self {
        Self {
            caller: caller.clone(),
            group: caller.child_token(),
            deadline: CancellationToken::new(),
        }
    }

    /// Condition to return if the scope is done, by priority:
    /// caller cancellation, then deadline, then sibling failure.
    pub fn done(&self) -> Option<GroupError> {
        self.fatal().or_else(|| {
            self.group
                .is_cancelled()
                .then_some(GroupError::GroupCanceled)
        })
    }

    /// Only the conditions that can never be tolerated.
    pub fn fatal(&self) -> Option<GroupError> {
        if self.caller.is_cancelled() {
            Some(GroupError::Canceled)
        } else if self.deadline.is_cancelled() {
            Some(GroupError::DeadlineExceeded)
        } else {
            None
        }
    }

    pub fn is_failed(&self) -> bool {
        self.group.is_cancelled()
    }

    /// Record a task failure: cancels the group for everyone else.
    pub fn fail(&self) {
        self.group.cancel();
    }

    pub fn expire(&self) {
        self.deadline.cancel();
        self.group.cancel();
    }

    /// Resolves once the caller cancels or the deadline expires.
    pub async fn fatal_cancelled(&self) {
        tokio::select! {
            _ = self.caller.cancelled() => {}
            _ = self.deadline.cancelled() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_cancellation_wins_over_deadline() {
        let caller = CancellationToken::new();
        let scope = Scope::new(&caller);
        assert!(scope.done().is_none());

        scope.expire();
        assert!(matches!(scope.done(), Some(GroupError::DeadlineExceeded)));

        caller.cancel();
        assert!(matches!(scope.done(), Some(GroupError::Canceled)));
    }

    #[test]
    fn failure_is_not_fatal() {
        let caller = CancellationToken::new();
        let scope = Scope::new(&caller);
        scope.fail();

        assert!(scope.is_failed());
        assert!(scope.fatal().is_none());
        assert!(matches!(scope.done(), Some(GroupError::GroupCanceled)));
        assert!(!caller.is_cancelled());
    }
}
