//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (medirag-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod document;
pub mod evaluation;
pub mod memory;
pub mod metrics;
