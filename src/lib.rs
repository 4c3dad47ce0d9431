//! Verdict: a sequential test execution engine.
//!
//! Given a tree of test containers and cases, Verdict runs them in a
//! well-defined order, manages per-container and per-case instance
//! lifecycles, invokes extension callbacks around lifecycle boundaries,
//! aggregates teardown failures without losing information, and reports
//! each node's terminal outcome to a caller-supplied listener.

pub use crate::engine::Engine;
pub use crate::errors::{print_error, VerdictError};
pub use crate::failure::{combine, Failure, FailureCollector, FailureKind};
pub use crate::unique_id::{IdFormat, Segment, UniqueId};

pub mod context;
pub mod descriptor;
pub mod engine;
pub mod errors;
pub mod execution;
pub mod extension;
pub mod failure;
pub mod fixture;
pub mod listener;
pub mod report;
pub mod suite;
pub mod unique_id;
