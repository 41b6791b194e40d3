// src/engine/mod.rs

//! Entry points of a group call.
//!
//! [`go`] and [`try_go`] validate the options, split the submitted tasks into
//! dependency-graph tasks and plain tasks, run both on one bounded group and
//! arbitrate between caller cancellation, the optional timeout and
//! completion.

mod orchestrator;

pub use orchestrator::{go, try_go};
