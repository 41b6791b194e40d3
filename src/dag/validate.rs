// src/dag/validate.rs

//! Structural validation of the dependency graph.
//!
//! Only named descriptors take part. Anonymous tasks can still declare
//! dependencies; a broken reference from one of those surfaces at run time as
//! [`crate::GroupError::MissingSignal`].

use std::collections::HashSet;

use petgraph::graphmap::DiGraphMap;

use crate::dag::descriptor::Descriptor;
use crate::errors::GraphError;

/// Checks, in order: duplicate source names, missing dependency targets,
/// cycles. Returns the first violation found.
///
/// Descriptor iteration order is whatever the caller provides (a hash map in
/// practice), so when several violations exist which one is reported is
/// unspecified.
pub fn verify<'a, I>(descriptors: I) -> Result<(), GraphError>
where
    I: IntoIterator<Item = &'a Descriptor>,
{
    // Edge direction: task -> dependency.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let mut sources: HashSet<&str> = HashSet::new();
    let mut named: Vec<&Descriptor> = Vec::new();

    for descriptor in descriptors {
        if descriptor.is_anonymous() {
            continue;
        }
        let node = descriptor.name.as_str();
        if !sources.insert(node) {
            return Err(GraphError::DuplicateSource(node.to_string()));
        }
        graph.add_node(node);
        named.push(descriptor);
    }

    for descriptor in named.iter().copied() {
        for dep in &descriptor.depends_on {
            if !sources.contains(dep.as_str()) {
                return Err(GraphError::MissingDependency(dep.clone()));
            }
            graph.add_edge(descriptor.name.as_str(), dep.as_str(), ());
        }
    }

    let mut search = CycleSearch {
        graph: &graph,
        path: Vec::new(),
        on_path: HashSet::new(),
        visited: HashSet::new(),
    };
    for node in graph.nodes() {
        if search.visited.contains(node) {
            continue;
        }
        if let Some(cycle) = search.visit(node) {
            return Err(GraphError::Cycle(cycle));
        }
    }

    Ok(())
}

/// Depth-first search keeping the current path so a cycle can be reported as
/// a closed chain.
struct CycleSearch<'g, 'a> {
    graph: &'g DiGraphMap<&'a str, ()>,
    path: Vec<&'a str>,
    on_path: HashSet<&'a str>,
    visited: HashSet<&'a str>,
}

impl<'a> CycleSearch<'_, 'a> {
    fn visit(&mut self, node: &'a str) -> Option<Vec<String>> {
        if self.on_path.contains(node) {
            let start = self.path.iter().position(|n| *n == node).unwrap_or(0);
            let mut chain: Vec<String> = self.path[start..].iter().map(|n| n.to_string()).collect();
            chain.push(node.to_string());
            return Some(chain);
        }
        if !self.visited.insert(node) {
            return None;
        }

        self.on_path.insert(node);
        self.path.push(node);
        let graph = self.graph;
        for dep in graph.neighbors(node) {
            if let Some(cycle) = self.visit(dep) {
                return Some(cycle);
            }
        }
        self.path.pop();
        self.on_path.remove(node);
        None
    }
}
