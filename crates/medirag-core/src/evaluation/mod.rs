//! Offline evaluation of retrieval quality, latency and memory usage.

pub mod dataset;
pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod stats;
