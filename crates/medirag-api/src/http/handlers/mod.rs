//! REST API route handlers.

pub mod chat;
pub mod evaluation;
pub mod knowledge;
pub mod memory;
pub mod system;
