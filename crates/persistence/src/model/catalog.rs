//! Entity catalog: the lookup from a model name to what the name denotes.
//!
//! The catalog answers "does this name exist, and what kind of entity is
//! it". A name the catalog does not know is a model that does not exist.

use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::AdapterKind;

/// What an entity derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "lineage")]
pub enum EntityLineage {
    /// A relational entity; abstract base classes have no table.
    Relational {
        /// True for abstract bases.
        #[serde(default)]
        abstract_class: bool,
    },
    /// A document entity.
    Document,
    /// Not a persistence entity.
    Plain,
}

/// Description of a named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Fully-qualified name.
    pub name: String,

    /// What the entity derives from.
    #[serde(flatten)]
    pub lineage: EntityLineage,

    /// Human-readable name, if the entity declares one.
    #[serde(default)]
    pub human_name: Option<String>,
}

impl EntityDescriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, lineage: EntityLineage) -> Self {
        Self {
            name: name.into(),
            lineage,
            human_name: None,
        }
    }

    /// A concrete relational entity.
    pub fn relational(name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntityLineage::Relational {
                abstract_class: false,
            },
        )
    }

    /// An abstract relational base.
    pub fn abstract_relational(name: impl Into<String>) -> Self {
        Self::new(
            name,
            EntityLineage::Relational {
                abstract_class: true,
            },
        )
    }

    /// A document entity.
    pub fn document(name: impl Into<String>) -> Self {
        Self::new(name, EntityLineage::Document)
    }

    /// A name that is not a persistence entity.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, EntityLineage::Plain)
    }

    /// Sets the human-readable name.
    pub fn with_human_name(mut self, human_name: impl Into<String>) -> Self {
        self.human_name = Some(human_name.into());
        self
    }

    /// Returns the adapter kind, or `None` for abstract and plain entities.
    pub fn adapter_kind(&self) -> Option<AdapterKind> {
        match self.lineage {
            EntityLineage::Relational {
                abstract_class: false,
            } => Some(AdapterKind::Relational),
            EntityLineage::Relational {
                abstract_class: true,
            } => None,
            EntityLineage::Document => Some(AdapterKind::Document),
            EntityLineage::Plain => None,
        }
    }
}

/// Looks up entities by name.
pub trait EntityCatalog: Send + Sync + Debug {
    /// Returns the descriptor for a name, or `None` if the name cannot be
    /// loaded.
    fn lookup(&self, name: &str) -> Option<EntityDescriptor>;
}

/// An in-memory catalog.
///
/// Entries can be added and removed at runtime; models resolved from it see
/// the change on their next access.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entities: RwLock<HashMap<String, EntityDescriptor>>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given descriptors.
    pub fn with_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = EntityDescriptor>,
    {
        let catalog = Self::new();
        for entity in entities {
            catalog.register(entity);
        }
        catalog
    }

    /// Adds or replaces a descriptor.
    pub fn register(&self, entity: EntityDescriptor) {
        self.entities.write().insert(entity.name.clone(), entity);
    }

    /// Removes a descriptor. Returns true if it was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.entities.write().remove(name).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl EntityCatalog for StaticCatalog {
    fn lookup(&self, name: &str) -> Option<EntityDescriptor> {
        self.entities.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_kind_from_lineage() {
        assert_eq!(
            EntityDescriptor::relational("Team").adapter_kind(),
            Some(AdapterKind::Relational)
        );
        assert_eq!(
            EntityDescriptor::abstract_relational("ApplicationRecord").adapter_kind(),
            None
        );
        assert_eq!(
            EntityDescriptor::document("Note").adapter_kind(),
            Some(AdapterKind::Document)
        );
        assert_eq!(EntityDescriptor::plain("Struct").adapter_kind(), None);
    }

    #[test]
    fn test_static_catalog() {
        let catalog = StaticCatalog::with_entities([
            EntityDescriptor::relational("Team"),
            EntityDescriptor::document("Note"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("Team").map(|e| e.name), Some("Team".to_string()));
        assert!(catalog.lookup("Player").is_none());

        assert!(catalog.unregister("Team"));
        assert!(!catalog.unregister("Team"));
        assert!(catalog.lookup("Team").is_none());
    }

    #[test]
    fn test_descriptor_deserialize() {
        let entity: EntityDescriptor = serde_json::from_str(
            r#"{"name": "Base", "lineage": "relational", "abstract_class": true}"#,
        )
        .unwrap();
        assert_eq!(entity.adapter_kind(), None);

        let entity: EntityDescriptor =
            serde_json::from_str(r#"{"name": "Note", "lineage": "document"}"#).unwrap();
        assert_eq!(entity.adapter_kind(), Some(AdapterKind::Document));
    }
}
