//! SQLite backend implementation.
//!
//! Table-backed models for the relational side of the admin layer. Models are
//! mapped to tables with [`TableSchema`] and declare their associations as
//! [`Reflection`]s; filters compile to parameterised SQL fragments.
//!
//! In-memory databases (handy for tests) use a single pooled connection so
//! every query sees the same data; file-based databases use a regular `r2d2`
//! pool.
//!
//! # Example
//!
//! ```no_run
//! use helios_admin_persistence::backends::sqlite::{Reflection, SqliteBackend, TableSchema};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.execute_batch("CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);")?;
//! backend.register_table(
//!     TableSchema::new("Blog::Post", "posts")
//!         .with_reflection(Reflection::has_many("comments", "Comment").with_as("commentable")),
//! );
//! # Ok(())
//! # }
//! ```

mod backend;
mod schema;
mod statement;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::{DEFAULT_PRIMARY_KEY, Reflection, ReflectionMacro, TableSchema};
pub use statement::SqliteStatementBuilder;
