// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use crate::dag::descriptor::Descriptor;
use crate::dag::validate;
use crate::errors::GraphError;
use crate::task::TaskId;

/// Accumulates task descriptors during the registration phase.
///
/// Registration is single-threaded; [`GraphBuilder::compile`] then produces
/// the immutable [`DepGraph`] that execution consumes.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    descriptors: HashMap<TaskId, Descriptor>,
    tolerant: HashSet<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder-style registration for `id`.
    pub fn task(&mut self, id: TaskId) -> Registration<'_> {
        Registration { graph: self, id }
    }

    pub fn descriptor(&self, id: TaskId) -> Option<&Descriptor> {
        self.descriptors.get(&id)
    }

    pub fn is_tolerant(&self, name: &str) -> bool {
        self.tolerant.contains(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Check for duplicate names, missing targets and cycles.
    ///
    /// # Panics
    ///
    /// In `strict` mode the first violation panics with its diagnostic.
    pub fn verify(&self, strict: bool) -> Result<(), GraphError> {
        match validate::verify(self.descriptors.values()) {
            Err(err) if strict => panic!("{err}"),
            other => other,
        }
    }

    /// Validate and freeze the graph.
    pub fn compile(&self) -> Result<DepGraph, GraphError> {
        self.verify(false)?;

        let nodes = self
            .descriptors
            .iter()
            .filter(|(_, d)| d.in_graph())
            .map(|(id, d)| (*id, d.clone()))
            .collect();

        Ok(DepGraph {
            nodes,
            tolerant: self.tolerant.clone(),
        })
    }
}

/// Builder-style handle returned by [`GraphBuilder::task`] and
/// [`crate::Options::task`].
#[derive(Debug)]
pub struct Registration<'a> {
    graph: &'a mut GraphBuilder,
    id: TaskId,
}

impl Registration<'_> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Bind a name to the task. Only the first call has any effect.
    pub fn register(self, name: impl Into<String>) -> Self {
        let descriptor = self.graph.descriptors.entry(self.id).or_default();
        if !descriptor.registered {
            descriptor.registered = true;
            if descriptor.name.is_empty() {
                descriptor.name = name.into();
            }
        }
        self
    }

    /// Append dependencies; empty names are dropped.
    pub fn depends_on<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return self;
        }

        self.graph
            .descriptors
            .entry(self.id)
            .or_default()
            .depends_on
            .extend(names);
        self
    }

    /// Let dependents run even if this task fails. No-op for anonymous tasks.
    pub fn tolerant(self) -> Self {
        if let Some(descriptor) = self.graph.descriptors.get(&self.id) {
            if !descriptor.is_anonymous() {
                self.graph.tolerant.insert(descriptor.name.clone());
            }
        }
        self
    }

    /// Validate the whole graph right now.
    ///
    /// # Panics
    ///
    /// Panics with the diagnostic on the first violation found.
    pub fn validate(self) -> Self {
        if let Err(err) = self.graph.verify(true) {
            unreachable!("strict verification returned {err}");
        }
        self
    }
}

/// Immutable, validated dependency graph for one call.
#[derive(Debug, Clone)]
pub struct DepGraph {
    nodes: HashMap<TaskId, Descriptor>,
    tolerant: HashSet<String>,
}

impl DepGraph {
    /// Number of tasks scheduled through the dependency path.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn descriptor(&self, id: TaskId) -> Option<&Descriptor> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (TaskId, &Descriptor)> {
        self.nodes.iter().map(|(id, d)| (*id, d))
    }

    /// Names of all named tasks.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .values()
            .filter(|d| !d.is_anonymous())
            .map(|d| d.name.as_str())
    }

    /// Names marked tolerant at registration time.
    pub fn tolerant(&self) -> &HashSet<String> {
        &self.tolerant
    }
}
