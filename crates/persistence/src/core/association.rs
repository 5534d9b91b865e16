//! Uniform association metadata.
//!
//! Each backend describes relationships in its own vocabulary (reflections
//! for relational tables, relations for document collections). Both are
//! normalised into [`Association`] so the registry and the children traversal
//! work the same way over either store.

use serde::{Deserialize, Serialize};

/// The shape of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// The owner has at most one related record.
    HasOne,
    /// The owner has any number of related records.
    HasMany,
    /// The owner references a single record of a fixed type.
    BelongsTo,
    /// The owner references a single record whose type is stored alongside
    /// the key.
    PolymorphicBelongsTo,
}

impl AssociationKind {
    /// Returns true for associations whose related records are children of
    /// the owner.
    pub fn is_child(&self) -> bool {
        matches!(self, AssociationKind::HasOne | AssociationKind::HasMany)
    }
}

/// A relationship declared by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Association name (e.g., "comments").
    pub name: String,

    /// Association shape.
    pub kind: AssociationKind,

    /// Fully-qualified name of the related model. Absent for polymorphic
    /// belongs-to associations, whose target varies per record.
    pub target_class_name: Option<String>,

    /// Polymorphic interface name this association implements (e.g.,
    /// "commentable" for `has_many :comments, as: :commentable`).
    pub as_name: Option<String>,

    /// Key column linking the two sides.
    ///
    /// For child associations it lives on the child and holds the owner's
    /// primary key; for belongs-to associations it lives on the owner.
    pub foreign_key: String,

    /// Column holding the owner's model name for polymorphic links.
    pub foreign_type: Option<String>,

    /// True when the related records are stored inside the owner.
    #[serde(default)]
    pub embedded: bool,
}

impl Association {
    /// Creates an association with no polymorphic interface.
    pub fn new(
        name: impl Into<String>,
        kind: AssociationKind,
        target_class_name: Option<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target_class_name,
            as_name: None,
            foreign_key: foreign_key.into(),
            foreign_type: None,
            embedded: false,
        }
    }

    /// Declares the polymorphic interface implemented by this association.
    pub fn with_as(mut self, as_name: impl Into<String>, foreign_type: impl Into<String>) -> Self {
        self.as_name = Some(as_name.into());
        self.foreign_type = Some(foreign_type.into());
        self
    }

    /// Marks the association as embedded in the owner.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Returns the non-empty polymorphic interface name, if any.
    pub fn polymorphic_as(&self) -> Option<&str> {
        self.as_name.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_kinds() {
        assert!(AssociationKind::HasOne.is_child());
        assert!(AssociationKind::HasMany.is_child());
        assert!(!AssociationKind::BelongsTo.is_child());
        assert!(!AssociationKind::PolymorphicBelongsTo.is_child());
    }

    #[test]
    fn test_polymorphic_as_ignores_empty() {
        let assoc = Association::new(
            "comments",
            AssociationKind::HasMany,
            Some("Comment".to_string()),
            "commentable_id",
        );
        assert_eq!(assoc.polymorphic_as(), None);

        let assoc = assoc.with_as("commentable", "commentable_type");
        assert_eq!(assoc.polymorphic_as(), Some("commentable"));
        assert_eq!(assoc.foreign_type.as_deref(), Some("commentable_type"));

        let mut blank = assoc.clone();
        blank.as_name = Some(String::new());
        assert_eq!(blank.polymorphic_as(), None);
    }
}
