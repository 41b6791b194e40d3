// crates/test-utils/src/logger.rs

use std::sync::Mutex;

use depgroup::{GroupEvent, GroupLogger};

/// Owned copy of a [`GroupEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: &'static str,
    pub method: Option<String>,
    pub prefix: Option<String>,
    pub task: Option<String>,
    pub error: Option<String>,
}

/// A [`GroupLogger`] that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events().iter().filter(|e| e.kind == kind).count()
    }
}

impl GroupLogger for RecordingLogger {
    fn record(&self, event: &GroupEvent<'_>) {
        let recorded = match event {
            GroupEvent::GroupStarted { method, prefix } => RecordedEvent {
                kind: "GroupStarted",
                method: Some(method.to_string()),
                prefix: Some(prefix.to_string()),
                task: None,
                error: None,
            },
            GroupEvent::GroupDone {
                method,
                prefix,
                error,
                ..
            } => RecordedEvent {
                kind: "GroupDone",
                method: Some(method.to_string()),
                prefix: Some(prefix.to_string()),
                task: None,
                error: error.map(|e| e.to_string()),
            },
            GroupEvent::GroupTimeout { method, prefix, .. } => RecordedEvent {
                kind: "GroupTimeout",
                method: Some(method.to_string()),
                prefix: Some(prefix.to_string()),
                task: None,
                error: None,
            },
            GroupEvent::TaskDone {
                method,
                prefix,
                task,
                ..
            } => RecordedEvent {
                kind: "TaskDone",
                method: Some(method.to_string()),
                prefix: Some(prefix.to_string()),
                task: Some(task.to_string()),
                error: None,
            },
            GroupEvent::TaskFailed {
                method,
                prefix,
                task,
                error,
                ..
            } => RecordedEvent {
                kind: "TaskFailed",
                method: Some(method.to_string()),
                prefix: Some(prefix.to_string()),
                task: Some(task.to_string()),
                error: Some(error.to_string()),
            },
            GroupEvent::TaskPanicked { task, message, .. } => RecordedEvent {
                kind: "TaskPanicked",
                method: None,
                prefix: None,
                task: Some(task.to_string()),
                error: Some(message.to_string()),
            },
        };
        self.events.lock().unwrap().push(recorded);
    }
}
