//! Helios Admin Persistence Layer
//!
//! This crate lets an administration UI treat models stored in different
//! persistence technologies uniformly. It provides:
//!
//! - a **filter compiler** turning user-typed filters (column, type, operator,
//!   value) into backend predicates, including relative date shortcuts
//!   (`today`, `last_week`, `between`, ...)
//! - a **model facade** resolving configured model names into [`Model`]s,
//!   introspecting their associations, answering which models own a
//!   polymorphic association, and traversing a record's children
//!
//! # Backend Features
//!
//! - `sqlite` (default) - relational models in SQLite
//! - the in-process document backend is always available
//!
//! # Architecture
//!
//! - [`filter`] - filter specifications, date duration resolution, the
//!   statement builder contract
//! - [`core`] - the [`BackendAdapter`] trait, associations and records
//! - [`model`] - the model registry, polymorphic index and children traversal
//! - [`backends`] - SQLite and document implementations
//! - [`config`] - configuration
//! - [`error`] - error types
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use helios_admin_persistence::backends::document::{CollectionSchema, DocumentBackend, Relation};
//! use helios_admin_persistence::config::AdminConfig;
//! use helios_admin_persistence::core::AdapterKind;
//! use helios_admin_persistence::filter::FilterSpec;
//! use helios_admin_persistence::model::{EntityDescriptor, ModelRegistry, StaticCatalog};
//! use serde_json::json;
//!
//! let documents = DocumentBackend::new();
//! documents.register_collection(
//!     CollectionSchema::new("Note", "notes")
//!         .with_relation(Relation::has_many("comments", "Comment").with_as("commentable")),
//! );
//!
//! let catalog = Arc::new(StaticCatalog::with_entities([
//!     EntityDescriptor::document("Note"),
//!     EntityDescriptor::document("Comment"),
//! ]));
//! let config = AdminConfig::new(vec!["Note".to_string(), "Comment".to_string()]);
//! let registry = ModelRegistry::new(&config, catalog).with_adapter(Arc::new(documents));
//!
//! assert_eq!(
//!     registry.polymorphic_parents(AdapterKind::Document, "Comment", "commentable"),
//!     vec!["Note".to_string()]
//! );
//!
//! let note = registry.resolve("Note").unwrap();
//! let predicate = note
//!     .compile_filter(&FilterSpec::new("title", "string", "starts_with", "Intro"))
//!     .unwrap();
//! assert_eq!(
//!     predicate.as_document(),
//!     Some(&json!({"title": {"$regex": "^Intro", "$options": "i"}}))
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod model;

// Re-export commonly used types at crate root
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult};
pub use filter::{FilterSpec, Predicate, StatementBuilder};
pub use model::{Model, ModelRegistry};

// Re-export core traits
pub use core::{AdapterKind, Association, AssociationKind, BackendAdapter, Record};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
