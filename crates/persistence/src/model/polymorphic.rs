//! Reverse lookup of polymorphic owners.
//!
//! A polymorphic association (`has_many :comments, as: :commentable`) can be
//! declared by any number of models. Given the target model and the
//! interface name, the index answers which models may own a record.

use std::collections::HashMap;

use super::facade::Model;
use super::inflector::underscore;

/// Owners of polymorphic associations keyed by `(underscore(target), as)`.
///
/// Owners are listed in the order their associations were visited. A model
/// declaring the same interface twice appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolymorphicIndex {
    buckets: HashMap<(String, String), Vec<String>>,
}

impl PolymorphicIndex {
    /// Builds the index from a set of models.
    pub fn build(models: &[Model]) -> Self {
        let mut buckets: HashMap<(String, String), Vec<String>> = HashMap::new();

        for model in models {
            for association in model.associations() {
                let Some(as_name) = association.polymorphic_as() else {
                    continue;
                };
                let Some(target) = association.target_class_name.as_deref() else {
                    continue;
                };
                buckets
                    .entry((underscore(target), as_name.to_string()))
                    .or_default()
                    .push(model.name().to_string());
            }
        }

        Self { buckets }
    }

    /// Returns the models that may own `model_name` through `as_name`.
    pub fn parents_of(&self, model_name: &str, as_name: &str) -> &[String] {
        self.buckets
            .get(&(underscore(model_name), as_name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the number of `(target, as)` keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no polymorphic association was found.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
