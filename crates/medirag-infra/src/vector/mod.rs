//! Vector search infrastructure for the knowledge base.
//!
//! LanceDB stores chunk vectors; fastembed generates them locally. The
//! Arrow schema defines the chunk table layout.

pub mod chunks;
pub mod embedder;
pub mod lance;
pub mod schema;
