//! Core abstractions shared by every backend.
//!
//! - [`AdapterKind`] - relational vs document
//! - [`BackendAdapter`] - capability interface a backend implements
//! - [`Association`] - uniform association metadata
//! - [`Record`] - backend-neutral row/document
//!
//! # Example: Implementing a Backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use helios_admin_persistence::core::{AdapterKind, Association, BackendAdapter, Record};
//! use helios_admin_persistence::error::BackendResult;
//! use helios_admin_persistence::filter::{FilterSpec, Predicate};
//!
//! #[derive(Debug)]
//! struct MyBackend;
//!
//! #[async_trait]
//! impl BackendAdapter for MyBackend {
//!     fn kind(&self) -> AdapterKind {
//!         AdapterKind::Document
//!     }
//!
//!     fn backend_name(&self) -> &'static str {
//!         "my-backend"
//!     }
//!
//!     // ... implement the remaining required methods
//! }
//! ```

pub mod association;
pub mod backend;
pub mod record;

pub use association::{Association, AssociationKind};
pub use backend::{AdapterKind, BackendAdapter};
pub use record::Record;
