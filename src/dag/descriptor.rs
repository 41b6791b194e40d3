// src/dag/descriptor.rs

//! Per-task metadata and per-node execution state.

/// Registration metadata for one task.
///
/// An empty `name` marks an anonymous task: it may depend on others, but
/// nothing can depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    /// Dependency names in declaration order. Never contains `""`.
    pub depends_on: Vec<String>,
    /// Whether `register` has been called for this task.
    pub(crate) registered: bool,
}

impl Descriptor {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Name for logs and errors: the registered name, or `fallback` for
    /// anonymous tasks.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.is_anonymous() {
            fallback
        } else {
            &self.name
        }
    }

    /// Whether the task takes part in dependency scheduling at all.
    pub(crate) fn in_graph(&self) -> bool {
        !self.is_anonymous() || !self.depends_on.is_empty()
    }
}

/// Lifecycle of one graph node during a call.
///
/// `Done` and `Aborted` both publish the node's completion signal; only
/// `Done` ran the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Pending,
    WaitingOnDeps,
    Running,
    Done,
    Aborted,
}

impl NodeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::Done | NodeState::Aborted)
    }
}
