//! Model registry.
//!
//! The registry resolves configured model names into [`Model`]s and caches
//! the resulting set together with one [`PolymorphicIndex`] per adapter kind.
//! Both caches are filled on first use and kept until explicitly reset.
//!
//! Concurrent first readers may each build the cache; the build is a pure
//! function of the configuration, catalog and backends, so whichever result
//! lands first is kept and the others are discarded.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::AdminConfig;
use crate::core::{AdapterKind, BackendAdapter};
use crate::error::{AdminResult, ModelError};

use super::catalog::EntityCatalog;
use super::facade::Model;
use super::polymorphic::PolymorphicIndex;

/// Resolves and caches models.
pub struct ModelRegistry {
    /// Configured model names, in order.
    models_pool: Vec<String>,

    /// Whether unresolvable model names are reported.
    warn_on_missing_models: bool,

    /// Entity lookup.
    catalog: Arc<dyn EntityCatalog>,

    /// One backend per adapter kind.
    adapters: HashMap<AdapterKind, Arc<dyn BackendAdapter>>,

    /// Every resolvable configured model, once computed.
    all: RwLock<Option<Arc<Vec<Model>>>>,

    /// Polymorphic owner index per adapter kind.
    polymorphic_parents: RwLock<HashMap<AdapterKind, Arc<PolymorphicIndex>>>,
}

impl ModelRegistry {
    /// Creates a registry over the configured models.
    pub fn new(config: &AdminConfig, catalog: Arc<dyn EntityCatalog>) -> Self {
        Self {
            models_pool: config.models.clone(),
            warn_on_missing_models: config.warn_on_missing_models,
            catalog,
            adapters: HashMap::new(),
            all: RwLock::new(None),
            polymorphic_parents: RwLock::new(HashMap::new()),
        }
    }

    /// Registers the backend for its adapter kind, replacing any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.register_adapter(adapter);
        self
    }

    /// Registers the backend for its adapter kind and drops cached models.
    pub fn register_adapter(&mut self, adapter: Arc<dyn BackendAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
        self.reset();
        self.reset_polymorphic_parents();
    }

    /// Returns the backend registered for an adapter kind.
    pub fn adapter(&self, kind: AdapterKind) -> Option<&Arc<dyn BackendAdapter>> {
        self.adapters.get(&kind)
    }

    /// Resolves a model name.
    ///
    /// Returns `None` when the catalog cannot load the name, when the entity
    /// is abstract or not a persistence entity, or when no backend is
    /// registered for its kind.
    pub fn resolve(&self, name: &str) -> Option<Model> {
        let Some(entity) = self.catalog.lookup(name) else {
            if self.warn_on_missing_models {
                tracing::warn!(
                    "Could not load model {}, assuming model is non existing",
                    name
                );
            }
            return None;
        };

        let kind = entity.adapter_kind()?;

        let Some(adapter) = self.adapters.get(&kind) else {
            if self.warn_on_missing_models {
                tracing::warn!(
                    "Model {} is a {} entity but no {} backend is registered",
                    name,
                    kind,
                    kind
                );
            }
            return None;
        };

        Some(Model::new(
            name,
            kind,
            Arc::clone(adapter),
            Arc::clone(&self.catalog),
        ))
    }

    /// Resolves a model name, failing if it does not resolve.
    ///
    /// A persistence entity whose adapter kind has no registered backend
    /// fails with [`ModelError::NoAdapter`]; any other miss is
    /// [`ModelError::UnknownModel`].
    pub fn get(&self, name: &str) -> AdminResult<Model> {
        if let Some(model) = self.resolve(name) {
            return Ok(model);
        }
        let err = match self.catalog.lookup(name).and_then(|e| e.adapter_kind()) {
            Some(kind) => ModelError::NoAdapter { kind },
            None => ModelError::UnknownModel {
                model_name: name.to_string(),
            },
        };
        Err(err.into())
    }

    /// Returns every resolvable configured model, optionally restricted to
    /// one adapter kind.
    ///
    /// Names are deduplicated keeping the first occurrence; unresolvable
    /// names are skipped.
    pub fn all(&self, kind: Option<AdapterKind>) -> Vec<Model> {
        let models = self.all_models();
        match kind {
            Some(kind) => models
                .iter()
                .filter(|m| m.adapter_kind() == kind)
                .cloned()
                .collect(),
            None => models.as_ref().clone(),
        }
    }

    fn all_models(&self) -> Arc<Vec<Model>> {
        if let Some(models) = self.all.read().as_ref() {
            return Arc::clone(models);
        }

        let mut seen = HashSet::new();
        let models: Vec<Model> = self
            .models_pool
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| self.resolve(name))
            .collect();
        tracing::debug!(
            "Resolved {} of {} configured models",
            models.len(),
            self.models_pool.len()
        );

        let mut guard = self.all.write();
        Arc::clone(guard.get_or_insert_with(|| Arc::new(models)))
    }

    /// Drops the cached model set. Models already handed out stay usable.
    pub fn reset(&self) {
        *self.all.write() = None;
    }

    /// Returns the models that may own `model_name` through the polymorphic
    /// interface `as_name`, among models of the given adapter kind.
    pub fn polymorphic_parents(
        &self,
        kind: AdapterKind,
        model_name: &str,
        as_name: &str,
    ) -> Vec<String> {
        self.polymorphic_index(kind)
            .parents_of(model_name, as_name)
            .to_vec()
    }

    /// Returns the polymorphic index for an adapter kind, building it on first
    /// use.
    pub fn polymorphic_index(&self, kind: AdapterKind) -> Arc<PolymorphicIndex> {
        if let Some(index) = self.polymorphic_parents.read().get(&kind) {
            return Arc::clone(index);
        }

        let index = PolymorphicIndex::build(&self.all(Some(kind)));
        tracing::debug!(
            "Built {} polymorphic index with {} keys",
            kind,
            index.len()
        );

        let mut guard = self.polymorphic_parents.write();
        Arc::clone(guard.entry(kind).or_insert_with(|| Arc::new(index)))
    }

    /// Drops every cached polymorphic index.
    pub fn reset_polymorphic_parents(&self) {
        self.polymorphic_parents.write().clear();
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models_pool", &self.models_pool)
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("cached", &self.all.read().is_some())
            .finish()
    }
}
