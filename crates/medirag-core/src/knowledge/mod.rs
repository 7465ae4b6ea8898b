//! Knowledge base: chunking, embedding, vector storage and hybrid search.

pub mod box_embedder;
pub mod box_store;
pub mod chunker;
pub mod embedder;
pub mod fallback;
pub mod hashing;
pub mod memory_store;
pub mod scoring;
pub mod seed;
pub mod service;
pub mod store;
