//! Application layer (use-cases, policies).
//!
//! Orchestrates domain logic over the completion capability and the pure
//! matching engine, without depending on the CLI or on storage.

pub mod assistant;
pub mod files;
pub mod pattern;
