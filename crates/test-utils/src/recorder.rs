// crates/test-utils/src/recorder.rs

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use depgroup::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Finish,
}

#[derive(Debug, Clone)]
struct Entry {
    task: String,
    phase: Phase,
    at: Duration,
}

/// Builds tasks that note when they start and finish, relative to the moment
/// the recorder was created.
#[derive(Debug, Clone)]
pub struct Recorder {
    origin: Instant,
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A task that sleeps for `work` and succeeds.
    pub fn task(&self, name: &str, work: Duration) -> Task {
        self.build(name, work, None)
    }

    /// A task that sleeps for `work` and then fails with `message`.
    pub fn failing(&self, name: &str, work: Duration, message: &str) -> Task {
        self.build(name, work, Some(message.to_string()))
    }

    fn build(&self, name: &str, work: Duration, failure: Option<String>) -> Task {
        let recorder = self.clone();
        let name = name.to_string();
        Task::new(move || async move {
            recorder.note(&name, Phase::Start);
            tokio::time::sleep(work).await;
            recorder.note(&name, Phase::Finish);
            match failure {
                Some(message) => Err(anyhow::anyhow!(message)),
                None => Ok(()),
            }
        })
    }

    pub fn note(&self, task: &str, phase: Phase) {
        let at = self.origin.elapsed();
        self.entries.lock().unwrap().push(Entry {
            task: task.to_string(),
            phase,
            at,
        });
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn started(&self, task: &str) -> bool {
        self.start_of(task).is_some()
    }

    pub fn finished(&self, task: &str) -> bool {
        self.finish_of(task).is_some()
    }

    pub fn start_of(&self, task: &str) -> Option<Duration> {
        self.find(task, Phase::Start)
    }

    pub fn finish_of(&self, task: &str) -> Option<Duration> {
        self.find(task, Phase::Finish)
    }

    /// Task names in the order they started.
    pub fn start_order(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.phase == Phase::Start)
            .map(|e| e.task.clone())
            .collect()
    }

    /// True when `task` started no earlier than `dependency` finished.
    pub fn started_after(&self, task: &str, dependency: &str) -> bool {
        match (self.start_of(task), self.finish_of(dependency)) {
            (Some(start), Some(finish)) => start >= finish,
            _ => false,
        }
    }

    fn find(&self, task: &str, phase: Phase) -> Option<Duration> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.task == task && e.phase == phase)
            .map(|e| e.at)
    }
}
