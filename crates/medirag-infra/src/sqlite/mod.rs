//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

mod codec;

pub mod document;
pub mod evaluation;
pub mod memory;
pub mod metrics;
pub mod pool;
