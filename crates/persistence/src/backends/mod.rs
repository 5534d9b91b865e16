//! Backend implementations.
//!
//! | Backend | Feature | Adapter kind |
//! |---------|---------|--------------|
//! | SQLite | `sqlite` (default) | relational |
//! | Document | always available | document |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! use helios_admin_persistence::backends::sqlite::SqliteBackend;
//! use helios_admin_persistence::backends::document::DocumentBackend;
//!
//! # #[cfg(feature = "sqlite")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let relational = SqliteBackend::open("./data/admin.db")?;
//! let documents = DocumentBackend::new();
//! # Ok(())
//! # }
//! ```

pub mod document;

#[cfg(feature = "sqlite")]
pub mod sqlite;
