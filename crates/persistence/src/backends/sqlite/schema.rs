//! Table mapping and reflections for the SQLite backend.

use serde::{Deserialize, Serialize};

use crate::core::{Association, AssociationKind};
use crate::model::inflector;

/// Default primary key column.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Reflection macros understood by the relational backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionMacro {
    /// `has_one`
    HasOne,
    /// `has_many`
    HasMany,
    /// `belongs_to`
    BelongsTo,
}

/// An association declared on a table-backed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// Association name.
    pub name: String,

    /// Reflection macro.
    #[serde(rename = "macro")]
    pub reflection_macro: ReflectionMacro,

    /// Related model; absent for polymorphic belongs-to.
    #[serde(default)]
    pub class_name: Option<String>,

    /// Explicit foreign key column.
    #[serde(default)]
    pub foreign_key: Option<String>,

    /// Polymorphic interface (`has_many :comments, as: :commentable`).
    #[serde(default, rename = "as")]
    pub as_name: Option<String>,

    /// `belongs_to ..., polymorphic: true`
    #[serde(default)]
    pub polymorphic: bool,
}

impl Reflection {
    fn new(name: &str, reflection_macro: ReflectionMacro, class_name: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            reflection_macro,
            class_name: class_name.map(String::from),
            foreign_key: None,
            as_name: None,
            polymorphic: false,
        }
    }

    /// `has_one`
    pub fn has_one(name: &str, class_name: &str) -> Self {
        Self::new(name, ReflectionMacro::HasOne, Some(class_name))
    }

    /// `has_many`
    pub fn has_many(name: &str, class_name: &str) -> Self {
        Self::new(name, ReflectionMacro::HasMany, Some(class_name))
    }

    /// `belongs_to`
    pub fn belongs_to(name: &str, class_name: &str) -> Self {
        Self::new(name, ReflectionMacro::BelongsTo, Some(class_name))
    }

    /// `belongs_to ..., polymorphic: true`
    pub fn belongs_to_polymorphic(name: &str) -> Self {
        let mut reflection = Self::new(name, ReflectionMacro::BelongsTo, None);
        reflection.polymorphic = true;
        reflection
    }

    /// Sets the polymorphic interface.
    pub fn with_as(mut self, as_name: &str) -> Self {
        self.as_name = Some(as_name.to_string());
        self
    }

    /// Overrides the foreign key column.
    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.to_string());
        self
    }

    /// Normalises the reflection into an [`Association`] of `owner_model`.
    ///
    /// Key columns follow the usual conventions: `has_*` keys are named after
    /// the owner (`author_id`) or the polymorphic interface
    /// (`commentable_id` + `commentable_type`); `belongs_to` keys are named
    /// after the association.
    pub fn to_association(&self, owner_model: &str) -> Association {
        let kind = match self.reflection_macro {
            ReflectionMacro::HasOne => AssociationKind::HasOne,
            ReflectionMacro::HasMany => AssociationKind::HasMany,
            ReflectionMacro::BelongsTo if self.polymorphic => {
                AssociationKind::PolymorphicBelongsTo
            }
            ReflectionMacro::BelongsTo => AssociationKind::BelongsTo,
        };

        let default_key = match (kind, self.as_name.as_deref()) {
            (AssociationKind::HasOne | AssociationKind::HasMany, Some(as_name)) => {
                format!("{}_id", as_name)
            }
            (AssociationKind::HasOne | AssociationKind::HasMany, None) => {
                inflector::foreign_key(owner_model)
            }
            _ => format!("{}_id", self.name),
        };

        let association = Association::new(
            self.name.clone(),
            kind,
            self.class_name.clone(),
            self.foreign_key.clone().unwrap_or(default_key),
        );

        match self.as_name.as_deref() {
            Some(as_name) => association.with_as(as_name, format!("{}_type", as_name)),
            None if self.polymorphic => Association {
                foreign_type: Some(format!("{}_type", self.name)),
                ..association
            },
            None => association,
        }
    }
}

/// Mapping of a model onto a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Fully-qualified model name.
    pub model_name: String,

    /// Table name.
    pub table: String,

    /// Primary key column.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// SQL condition applied to scoped reads (e.g., `deleted_at IS NULL`).
    #[serde(default)]
    pub default_scope: Option<String>,

    /// Declared reflections, in declaration order.
    #[serde(default)]
    pub reflections: Vec<Reflection>,
}

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

impl TableSchema {
    /// Creates a mapping with the default primary key.
    pub fn new(model_name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            table: table.into(),
            primary_key: default_primary_key(),
            default_scope: None,
            reflections: Vec::new(),
        }
    }

    /// Sets the primary key column.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Sets the default scope condition.
    pub fn with_default_scope(mut self, condition: impl Into<String>) -> Self {
        self.default_scope = Some(condition.into());
        self
    }

    /// Appends a reflection.
    pub fn with_reflection(mut self, reflection: Reflection) -> Self {
        self.reflections.push(reflection);
        self
    }

    /// Returns the normalised associations.
    pub fn associations(&self) -> Vec<Association> {
        self.reflections
            .iter()
            .map(|r| r.to_association(&self.model_name))
            .collect()
    }
}

/// Quotes an identifier for SQLite.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
