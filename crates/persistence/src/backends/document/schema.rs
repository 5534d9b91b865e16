//! Collection schema and native relation metadata for the document backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Association, AssociationKind};
use crate::model::inflector;

/// Primary key field of every document.
pub const DOCUMENT_ID: &str = "_id";

/// Relation macros understood by the document backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationMacro {
    /// One sub-document stored inside the owner.
    EmbedsOne,
    /// An array of sub-documents stored inside the owner.
    EmbedsMany,
    /// One referenced document pointing back at the owner.
    HasOne,
    /// Referenced documents pointing back at the owner.
    HasMany,
    /// The owner stores the referenced document's id.
    BelongsTo,
    /// The inverse of an embedding.
    EmbeddedIn,
}

/// A relation as declared on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name (also the field name of embedded relations).
    pub name: String,

    /// Relation macro.
    #[serde(rename = "macro")]
    pub relation_macro: RelationMacro,

    /// Related model. Absent for polymorphic belongs-to relations.
    #[serde(default)]
    pub class_name: Option<String>,

    /// Explicit foreign key field.
    #[serde(default)]
    pub foreign_key: Option<String>,

    /// Polymorphic interface implemented by this relation.
    #[serde(default, rename = "as")]
    pub as_name: Option<String>,

    /// True for belongs-to relations whose target type varies.
    #[serde(default)]
    pub polymorphic: bool,
}

impl Relation {
    fn new(name: &str, relation_macro: RelationMacro, class_name: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            relation_macro,
            class_name: class_name.map(String::from),
            foreign_key: None,
            as_name: None,
            polymorphic: false,
        }
    }

    /// `embeds_one`.
    pub fn embeds_one(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::EmbedsOne, Some(class_name))
    }

    /// `embeds_many`.
    pub fn embeds_many(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::EmbedsMany, Some(class_name))
    }

    /// `has_one`.
    pub fn has_one(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::HasOne, Some(class_name))
    }

    /// `has_many`.
    pub fn has_many(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::HasMany, Some(class_name))
    }

    /// `belongs_to`.
    pub fn belongs_to(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::BelongsTo, Some(class_name))
    }

    /// Polymorphic `belongs_to`.
    pub fn belongs_to_polymorphic(name: &str) -> Self {
        let mut relation = Self::new(name, RelationMacro::BelongsTo, None);
        relation.polymorphic = true;
        relation
    }

    /// `embedded_in`.
    pub fn embedded_in(name: &str, class_name: &str) -> Self {
        Self::new(name, RelationMacro::EmbeddedIn, Some(class_name))
    }

    /// Declares the polymorphic interface implemented by the relation.
    pub fn with_as(mut self, as_name: &str) -> Self {
        self.as_name = Some(as_name.to_string());
        self
    }

    /// Overrides the foreign key field.
    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.to_string());
        self
    }

    /// Normalises the relation into an [`Association`] of `owner_model`.
    pub fn to_association(&self, owner_model: &str) -> Association {
        let embedded = matches!(
            self.relation_macro,
            RelationMacro::EmbedsOne | RelationMacro::EmbedsMany | RelationMacro::EmbeddedIn
        );

        let kind = match self.relation_macro {
            RelationMacro::EmbedsOne | RelationMacro::HasOne => AssociationKind::HasOne,
            RelationMacro::EmbedsMany | RelationMacro::HasMany => AssociationKind::HasMany,
            RelationMacro::BelongsTo if self.polymorphic => AssociationKind::PolymorphicBelongsTo,
            RelationMacro::BelongsTo | RelationMacro::EmbeddedIn => AssociationKind::BelongsTo,
        };

        let default_key = match (self.relation_macro, self.as_name.as_deref()) {
            (RelationMacro::HasOne | RelationMacro::HasMany, Some(as_name)) => {
                format!("{}_id", as_name)
            }
            (RelationMacro::HasOne | RelationMacro::HasMany, None) => {
                inflector::foreign_key(owner_model)
            }
            (RelationMacro::BelongsTo, _) => format!("{}_id", self.name),
            _ => self.name.clone(),
        };

        let mut association = Association::new(
            self.name.clone(),
            kind,
            self.class_name.clone(),
            self.foreign_key.clone().unwrap_or(default_key),
        );
        association.embedded = embedded;

        if let Some(as_name) = self.as_name.as_deref() {
            association = association.with_as(as_name, format!("{}_type", as_name));
        } else if kind == AssociationKind::PolymorphicBelongsTo {
            association.foreign_type = Some(format!("{}_type", self.name));
        }

        association
    }
}

/// Mapping of a model onto a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Fully-qualified model name.
    pub model_name: String,

    /// Collection name.
    pub collection: String,

    /// Predicate applied to scoped reads.
    #[serde(default)]
    pub default_scope: Option<Value>,

    /// Declared relations, in declaration order.
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl CollectionSchema {
    /// Creates a schema with no default scope and no relations.
    pub fn new(model_name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            collection: collection.into(),
            default_scope: None,
            relations: Vec::new(),
        }
    }

    /// Sets the default scope.
    pub fn with_default_scope(mut self, scope: Value) -> Self {
        self.default_scope = Some(scope);
        self
    }

    /// Appends a relation.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_relations() {
        let assoc = Relation::has_many("notes", "Note").to_association("Blog::Author");
        assert_eq!(assoc.kind, AssociationKind::HasMany);
        assert_eq!(assoc.foreign_key, "author_id");
        assert!(!assoc.embedded);

        let assoc = Relation::belongs_to("author", "Blog::Author").to_association("Note");
        assert_eq!(assoc.kind, AssociationKind::BelongsTo);
        assert_eq!(assoc.foreign_key, "author_id");
    }

    #[test]
    fn test_embedded_relations() {
        let assoc = Relation::embeds_many("tags", "Tag").to_association("Note");
        assert_eq!(assoc.kind, AssociationKind::HasMany);
        assert_eq!(assoc.foreign_key, "tags");
        assert!(assoc.embedded);

        let assoc = Relation::embedded_in("note", "Note").to_association("Tag");
        assert_eq!(assoc.kind, AssociationKind::BelongsTo);
        assert!(assoc.embedded);
    }

    #[test]
    fn test_polymorphic_relations() {
        let assoc = Relation::has_many("comments", "Comment")
            .with_as("commentable")
            .to_association("Note");
        assert_eq!(assoc.polymorphic_as(), Some("commentable"));
        assert_eq!(assoc.foreign_key, "commentable_id");
        assert_eq!(assoc.foreign_type.as_deref(), Some("commentable_type"));

        let assoc = Relation::belongs_to_polymorphic("commentable").to_association("Comment");
        assert_eq!(assoc.kind, AssociationKind::PolymorphicBelongsTo);
        assert_eq!(assoc.target_class_name, None);
        assert_eq!(assoc.foreign_key, "commentable_id");
        assert_eq!(assoc.foreign_type.as_deref(), Some("commentable_type"));
    }

    #[test]
    fn test_explicit_foreign_key() {
        let assoc = Relation::has_one("profile", "Profile")
            .with_foreign_key("owner_ref")
            .to_association("User");
        assert_eq!(assoc.kind, AssociationKind::HasOne);
        assert_eq!(assoc.foreign_key, "owner_ref");
    }

    #[test]
    fn test_schema_deserialize() {
        let schema: CollectionSchema = serde_json::from_str(
            r#"{
                "model_name": "Note",
                "collection": "notes",
                "relations": [
                    {"name": "comments", "macro": "has_many", "class_name": "Comment", "as": "commentable"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.relations[0].as_name.as_deref(), Some("commentable"));
        assert_eq!(schema.default_scope, None);
    }
}
