//! Model and association facade.
//!
//! - [`ModelRegistry`] - resolves configured names into [`Model`]s and caches them
//! - [`Model`] - uniform handle over a relational or document model
//! - [`PolymorphicIndex`] - reverse lookup of polymorphic owners
//! - [`EntityCatalog`] - the name lookup the registry resolves against
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use helios_admin_persistence::backends::document::{CollectionSchema, DocumentBackend, Relation};
//! use helios_admin_persistence::config::AdminConfig;
//! use helios_admin_persistence::core::AdapterKind;
//! use helios_admin_persistence::model::{EntityDescriptor, ModelRegistry, StaticCatalog};
//!
//! let documents = DocumentBackend::new();
//! for (owner, collection) in [("Blog::Post", "posts"), ("Photo", "photos")] {
//!     documents.register_collection(
//!         CollectionSchema::new(owner, collection)
//!             .with_relation(Relation::has_many("comments", "Comment").with_as("commentable")),
//!     );
//! }
//!
//! let catalog = Arc::new(StaticCatalog::with_entities([
//!     EntityDescriptor::document("Blog::Post"),
//!     EntityDescriptor::document("Photo"),
//!     EntityDescriptor::document("Comment"),
//! ]));
//! let names = ["Blog::Post", "Photo", "Comment", "Missing"];
//! let config = AdminConfig::new(names.iter().map(|s| s.to_string()).collect());
//! let registry = ModelRegistry::new(&config, catalog).with_adapter(Arc::new(documents));
//!
//! assert_eq!(registry.all(Some(AdapterKind::Document)).len(), 3);
//! assert_eq!(registry.get("Blog::Post").unwrap().to_param(), "blog~post");
//! assert!(registry.get("Missing").is_err());
//!
//! let owners = registry.polymorphic_parents(AdapterKind::Document, "Comment", "commentable");
//! assert_eq!(owners, vec!["Blog::Post".to_string(), "Photo".to_string()]);
//! ```

pub mod catalog;
mod children;
pub mod facade;
pub mod inflector;
pub mod polymorphic;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{EntityCatalog, EntityDescriptor, EntityLineage, StaticCatalog};
pub use facade::Model;
pub use polymorphic::PolymorphicIndex;
pub use registry::ModelRegistry;
