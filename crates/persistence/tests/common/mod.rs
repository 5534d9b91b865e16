//! Test infrastructure for the admin persistence layer.
//!
//! Provides a small blog schema on SQLite, a notes schema on the document
//! backend, and a registry wired over both.

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::*;
