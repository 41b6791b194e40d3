// src/dag/mod.rs

//! Dependency graph representation and validation.
//!
//! - [`descriptor`] holds per-task registration metadata and node states.
//! - [`graph`] accumulates descriptors ([`GraphBuilder`]) and freezes them
//!   into a validated [`DepGraph`].
//! - [`validate`] detects duplicate names, missing targets and cycles.

pub mod descriptor;
pub mod graph;
pub mod validate;

pub use descriptor::{Descriptor, NodeState};
pub use graph::{DepGraph, GraphBuilder, Registration};
