//! The uniform model handle.

use std::fmt;
use std::sync::Arc;

use crate::core::{AdapterKind, Association, BackendAdapter, Record};
use crate::error::AdminResult;
use crate::filter::{FilterSpec, Predicate};

use super::catalog::{EntityCatalog, EntityDescriptor};
use super::inflector;

/// A persistence model resolved by the [`ModelRegistry`](super::ModelRegistry).
///
/// A `Model` only stores the model's name, its adapter kind and handles to its
/// backend and the entity catalog. The entity itself is looked up again on
/// every access, so a model handle never serves stale entity metadata.
#[derive(Clone)]
pub struct Model {
    name: String,
    kind: AdapterKind,
    adapter: Arc<dyn BackendAdapter>,
    catalog: Arc<dyn EntityCatalog>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("backend", &self.adapter.backend_name())
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Model {}

impl Model {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: AdapterKind,
        adapter: Arc<dyn BackendAdapter>,
        catalog: Arc<dyn EntityCatalog>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            adapter,
            catalog,
        }
    }

    /// Returns the fully-qualified model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the adapter kind.
    pub fn adapter_kind(&self) -> AdapterKind {
        self.kind
    }

    /// Returns the backend serving this model.
    pub fn adapter(&self) -> &Arc<dyn BackendAdapter> {
        &self.adapter
    }

    /// Looks the entity up again in the catalog.
    pub fn entity(&self) -> Option<EntityDescriptor> {
        self.catalog.lookup(&self.name)
    }

    /// URL-safe identifier (`"Blog::Post"` -> `"blog~post"`).
    pub fn to_param(&self) -> String {
        inflector::to_param(&self.name)
    }

    /// Form parameter key (`"Blog::Post"` -> `"blog_post"`).
    pub fn param_key(&self) -> String {
        inflector::param_key(&self.name)
    }

    /// Human-readable name: the entity's own, else derived from the name.
    pub fn pretty_name(&self) -> String {
        self.entity()
            .and_then(|entity| entity.human_name)
            .unwrap_or_else(|| {
                inflector::humanize(&inflector::underscore(inflector::demodulize(&self.name)))
            })
    }

    /// Returns the model's associations as reported by its backend.
    pub fn associations(&self) -> Vec<Association> {
        self.adapter.associations(&self.name)
    }

    /// Returns one association by name.
    pub fn association(&self, name: &str) -> Option<Association> {
        self.associations().into_iter().find(|a| a.name == name)
    }

    /// Compiles a filter with this model's backend.
    pub fn compile_filter(&self, filter: &FilterSpec) -> Option<Predicate> {
        self.adapter.compile_filter(filter)
    }

    /// Returns the records matching a predicate.
    pub async fn where_(&self, predicate: &Predicate) -> AdminResult<Vec<Record>> {
        Ok(self.adapter.where_(&self.name, predicate).await?)
    }
}
